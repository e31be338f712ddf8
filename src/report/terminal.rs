//! Line-oriented terminal sink for the live dashboard.

use std::io::Write;

use chrono::Local;

use crate::domain::{CumulativeStats, DailyBucket, HistorySample, LiveReadout, Notification, NotificationLevel};
use crate::poller::DisplaySink;
use crate::report::format::{format_cumulative, format_daily_buckets, format_history, format_live};

/// Prints each update as a timestamped line.
///
/// Live readouts that did not change since the last tick are not repeated.
pub struct TerminalSink<W: Write> {
    out: W,
    last_live: Option<LiveReadout>,
}

impl TerminalSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, last_live: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        let ts = Local::now().format("%H:%M:%S");
        if let Err(e) = writeln!(self.out, "[{ts}] {text}") {
            log::warn!("Failed to write dashboard line: {e}");
        }
    }
}

impl<W: Write> DisplaySink for TerminalSink<W> {
    fn show_live(&mut self, readout: &LiveReadout) {
        if self.last_live.as_ref() == Some(readout) {
            return;
        }
        self.last_live = Some(*readout);
        self.line(&format_live(readout));
    }

    fn show_history(&mut self, samples: &[HistorySample]) {
        self.line(&format_history(samples));
    }

    fn show_daily(&mut self, buckets: &[DailyBucket]) {
        self.line(&format!("Daily activity:\n{}", format_daily_buckets(buckets).trim_end()));
    }

    fn show_cumulative(&mut self, stats: &CumulativeStats) {
        self.line(&format_cumulative(stats));
    }

    fn notify(&mut self, notification: Notification) {
        let tag = match notification.level {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "ok",
            NotificationLevel::Error => "error",
        };
        self.line(&format!("[{tag}] {}", notification.message));
    }
}
