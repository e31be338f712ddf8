//! Command-line parsing for the Fit2Go dashboard client.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fetch/aggregate code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::DataSource;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fit2go", version, about = "Fit2Go fitness dashboard client")]
pub struct Cli {
    /// Backend base URL (overrides FIT2GO_BASE_URL).
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the live dashboard: poll the current session, history, daily summary
    /// and cumulative stats, and end finished sessions.
    Watch(WatchArgs),
    /// Merge one day's records from all health-data sources.
    Day(DayArgs),
    /// List recorded sessions.
    Calendar,
    /// Show one session in detail.
    Session {
        /// Session id.
        id: u64,
    },
    /// Per-15-minute stats for a day (default: today).
    Stats {
        /// Day to show (YYYY-MM-DD).
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Lifetime totals across all sessions.
    Cumulative,
    /// End a session.
    End {
        /// Session id.
        id: u64,
        /// Do not push the session to Google Fit / Health Connect.
        #[arg(long)]
        no_auto_sync: bool,
    },
    /// Push a session to Google Fit and Health Connect.
    Sync {
        /// Session id.
        id: u64,
    },
}

/// Options for the live dashboard.
#[derive(Debug, Args, Clone)]
pub struct WatchArgs {
    /// Seconds between live snapshot polls.
    #[arg(long, default_value_t = 1)]
    pub live_interval: u64,

    /// Seconds between daily summary refreshes.
    #[arg(long, default_value_t = 60)]
    pub summary_interval: u64,

    /// Seconds between cumulative stats refreshes.
    #[arg(long, default_value_t = 60)]
    pub cumulative_interval: u64,

    /// Minutes of recent history to fetch for the history chart.
    #[arg(long, default_value_t = 30)]
    pub history_minutes: i64,

    /// Do not sync sessions when they are ended automatically.
    #[arg(long)]
    pub no_auto_sync: bool,

    /// Stop after this many seconds (default: run until interrupted).
    #[arg(long, value_name = "SECS")]
    pub duration: Option<u64>,
}

/// Options for the daily summary.
#[derive(Debug, Args, Clone)]
pub struct DayArgs {
    /// Day to summarise (YYYY-MM-DD, default: today).
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Sources to merge (repeatable; default: all).
    #[arg(long = "source", value_enum)]
    pub sources: Vec<DataSource>,

    /// Use the backend's pre-integrated summary instead of merging locally.
    #[arg(long)]
    pub server: bool,

    /// Write the summary to a JSON file.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    /// Print a previously exported summary instead of fetching.
    #[arg(long, value_name = "JSON", conflicts_with_all = ["server", "export"])]
    pub from_file: Option<PathBuf>,
}
