//! Live dashboard refresh cycles.
//!
//! The `Poller` owns all mutable dashboard state: the tracked
//! session id, the per-cycle response ordering, and failure counters. Each
//! cycle fetches, then pushes to a `DisplaySink`. Failures are logged and
//! swallowed so the next tick simply tries again.

use std::collections::HashMap;

use chrono::{NaiveDateTime, Utc};
use log::{debug, error, info, warn};

use crate::data::DashboardApi;
use crate::domain::{
    CumulativeStats, DailyBucket, EndSessionResponse, HistorySample, LiveReadout, Notification, PollConfig,
    SessionStatus, SyncResult,
};
use crate::error::AppError;

pub mod notify;
pub mod schedule;
pub mod sequence;
pub mod session;

pub use notify::*;
pub use schedule::{Cycle, Schedule, run_loop};
pub use sequence::SequenceGate;
pub use session::SessionTracker;

/// Where refreshed data goes (gauges, readouts, charts, toasts).
pub trait DisplaySink {
    fn show_live(&mut self, readout: &LiveReadout);

    /// Zero the live gauges and readouts.
    fn reset_live(&mut self) {
        self.show_live(&LiveReadout::default());
    }

    fn show_history(&mut self, samples: &[HistorySample]);
    fn show_daily(&mut self, buckets: &[DailyBucket]);
    fn show_cumulative(&mut self, stats: &CumulativeStats);
    fn notify(&mut self, notification: Notification);
}

/// Mutable state shared by the refresh cycles.
///
/// `run_loop` finishes each cycle before starting the next, so the sequence
/// gates accept every response today. They only drop anything if cycles are
/// ever driven concurrently.
#[derive(Debug, Clone, Default)]
pub struct PollerState {
    pub session: SessionTracker,
    live_gate: SequenceGate,
    history_gate: SequenceGate,
    daily_gate: SequenceGate,
    cumulative_gate: SequenceGate,
    failures: HashMap<Cycle, u32>,
}

impl PollerState {
    pub fn consecutive_failures(&self, cycle: Cycle) -> u32 {
        self.failures.get(&cycle).copied().unwrap_or(0)
    }

    fn record_success(&mut self, cycle: Cycle) {
        if let Some(count) = self.failures.remove(&cycle) {
            info!("{} recovered after {count} failed attempt(s)", cycle.label());
        }
    }

    fn record_failure(&mut self, cycle: Cycle, err: &AppError) {
        let count = self.failures.entry(cycle).or_insert(0);
        *count += 1;
        warn!("{} refresh failed ({} in a row): {err}", cycle.label(), *count);
    }
}

pub struct Poller<A, S> {
    api: A,
    sink: S,
    config: PollConfig,
    state: PollerState,
}

impl<A: DashboardApi, S: DisplaySink> Poller<A, S> {
    pub fn new(api: A, sink: S, config: PollConfig) -> Self {
        Self {
            api,
            sink,
            config,
            state: PollerState::default(),
        }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    pub fn state(&self) -> &PollerState {
        &self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn run_cycle(&mut self, cycle: Cycle) {
        match cycle {
            Cycle::Live => self.poll(),
            Cycle::DailySummary => self.refresh_daily_summary(),
            Cycle::CumulativeStats => self.refresh_cumulative_stats(),
            Cycle::History => self.refresh_history(Utc::now().naive_utc()),
        }
    }

    /// Live cycle: snapshot, session lifecycle, and (while active) history.
    pub fn poll(&mut self) {
        self.poll_at(Utc::now().naive_utc());
    }

    pub fn poll_at(&mut self, now: NaiveDateTime) {
        let ticket = self.state.live_gate.begin();
        let snapshot = match self.api.current_session() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                self.state.record_failure(Cycle::Live, &err);
                return;
            }
        };
        if !self.state.live_gate.accept(ticket) {
            debug!("Dropping stale live snapshot #{ticket}");
            return;
        }
        self.state.record_success(Cycle::Live);

        let previous = self.state.session.active();
        let ended = self.state.session.observe(&snapshot.status);
        match snapshot.status {
            SessionStatus::Active { session_id } => {
                if previous != Some(session_id) {
                    self.sink.notify(session_started_notification(session_id, snapshot.start_time));
                }
                self.sink.show_live(&snapshot.readout());
                self.refresh_history(now);
            }
            SessionStatus::NoActiveSession => self.sink.reset_live(),
        }

        if let Some(session_id) = ended {
            self.finish_session(session_id);
        }
    }

    /// Fetch the trailing history window ending at `now`.
    ///
    /// An empty result leaves the previously shown chart as it is.
    pub fn refresh_history(&mut self, now: NaiveDateTime) {
        let start = now - self.config.history_window;
        let ticket = self.state.history_gate.begin();
        let samples = match self.api.history(start, now) {
            Ok(samples) => samples,
            Err(err) => {
                self.state.record_failure(Cycle::History, &err);
                return;
            }
        };
        if !self.state.history_gate.accept(ticket) {
            debug!("Dropping stale history response #{ticket}");
            return;
        }
        self.state.record_success(Cycle::History);
        if samples.is_empty() {
            debug!("History window {start}..{now} is empty; keeping current chart");
            return;
        }
        self.sink.show_history(&samples);
    }

    pub fn refresh_daily_summary(&mut self) {
        let ticket = self.state.daily_gate.begin();
        match self.api.daily_stats(None) {
            Ok(buckets) => {
                if self.state.daily_gate.accept(ticket) {
                    self.state.record_success(Cycle::DailySummary);
                    self.sink.show_daily(&buckets);
                }
            }
            Err(err) => self.state.record_failure(Cycle::DailySummary, &err),
        }
    }

    pub fn refresh_cumulative_stats(&mut self) {
        let ticket = self.state.cumulative_gate.begin();
        match self.api.cumulative() {
            Ok(stats) => {
                if self.state.cumulative_gate.accept(ticket) {
                    self.state.record_success(Cycle::CumulativeStats);
                    self.sink.show_cumulative(&stats);
                }
            }
            Err(err) => self.state.record_failure(Cycle::CumulativeStats, &err),
        }
    }

    /// Push a finished session to Google Fit and Health Connect on demand.
    pub fn sync_session(&mut self, session_id: u64) -> Result<SyncResult, AppError> {
        match self.api.sync_session(session_id) {
            Ok(result) => {
                for note in sync_notifications(&result) {
                    self.sink.notify(note);
                }
                Ok(result)
            }
            Err(err) => {
                self.sink.notify(Notification::error(format!("Sync of session {session_id} failed: {err}")));
                Err(err)
            }
        }
    }

    /// End `session_id` on the backend, syncing it when `auto_sync` is set.
    ///
    /// The outcome is always reported through the sink; callers decide
    /// whether a refused end is fatal.
    pub fn end_session(&mut self, session_id: u64) -> Result<EndSessionResponse, AppError> {
        info!("Ending session {session_id} (auto_sync={})", self.config.auto_sync);
        match self.api.end_session(session_id, self.config.auto_sync) {
            Ok(resp) => {
                if !resp.success {
                    warn!("Backend refused to end session {session_id}: {:?}", resp.error);
                }
                for note in end_session_notifications(session_id, &resp) {
                    self.sink.notify(note);
                }
                Ok(resp)
            }
            Err(err) => {
                error!("Error ending session {session_id}: {err}");
                self.sink.notify(Notification::error(format!("Failed to end session {session_id}: {err}")));
                Err(err)
            }
        }
    }

    // No retry: the tracker has already let go of the id.
    fn finish_session(&mut self, session_id: u64) {
        let _ = self.end_session(session_id);
    }
}
