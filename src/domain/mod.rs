//! Domain types used throughout the client.
//!
//! This module defines:
//!
//! - per-source daily records and the integrated daily summary
//! - live session snapshots and the readouts pushed to display sinks
//! - backend response shapes (history, daily buckets, sessions, sync results)

pub mod nullable;
pub mod timestamp;
pub mod types;

pub use types::*;
