//! Serde helper for fields the backend may send as explicit `null`.
//!
//! `#[serde(default)]` only covers missing keys; a key that is present with a
//! `null` value still fails to decode into a `Vec` or `HashMap`.

use serde::{Deserialize, Deserializer};

pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
