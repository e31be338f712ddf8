//! Reporting utilities: formatted terminal output and the terminal display sink.
//!
//! We keep formatting code in one place so the fetch/aggregate code stays
//! clean and output changes are localized.

pub mod format;
pub mod terminal;

pub use format::*;
pub use terminal::TerminalSink;
