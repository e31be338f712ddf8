//! Backend data access.
//!
//! - HTTP client + connection settings (`api`)

pub mod api;

pub use api::*;
