//! Input/output helpers.
//!
//! - integrated summary JSON read/write (`export`)

pub mod export;

pub use export::*;
