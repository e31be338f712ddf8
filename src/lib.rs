//! `fit2go-dashboard` library crate.
//!
//! The binary (`fit2go`) is a thin wrapper around this library so that:
//!
//! - aggregation and the poller lifecycle are testable without a backend
//! - modules are reusable by other front-ends
//! - code stays easy to navigate as the project grows

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod poller;
pub mod report;
