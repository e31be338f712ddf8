//! Shared domain types.
//!
//! Records mirror the backend's JSON shapes so they can be decoded directly at
//! the HTTP boundary, and the derived types serialize back out for exports.

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::nullable;

/// An external health-data source that reports per-day records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    #[value(name = "fit2go")]
    Fit2Go,
    #[value(name = "googlefit")]
    GoogleFit,
    #[value(name = "healthconnect")]
    HealthConnect,
}

impl DataSource {
    pub const ALL: [DataSource; 3] = [DataSource::Fit2Go, DataSource::GoogleFit, DataSource::HealthConnect];

    /// Path segment used by `/api/daily/{source}/{date}`.
    pub fn path_segment(self) -> &'static str {
        match self {
            DataSource::Fit2Go => "fit2go",
            DataSource::GoogleFit => "googlefit",
            DataSource::HealthConnect => "healthconnect",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            DataSource::Fit2Go => "Fit2Go",
            DataSource::GoogleFit => "Google Fit",
            DataSource::HealthConnect => "Health Connect",
        }
    }
}

/// One source's view of a single day.
///
/// Every field has a default so that a source which omits fields (or sends
/// `{}`) decodes to an empty record instead of failing the whole day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceDailyRecord {
    pub avg_heart_rate: Option<f64>,
    /// Minutes of recorded data; the weight for `avg_heart_rate`.
    pub duration: Option<f64>,
    pub active_time: Option<f64>,
    pub calories: Option<f64>,
    pub steps: Option<u64>,
    #[serde(deserialize_with = "nullable::null_as_default")]
    pub time_slots: Vec<String>,
    /// A `null` level counts as no activity for that slot.
    #[serde(deserialize_with = "nullable::null_as_default")]
    pub activity_levels: HashMap<String, Option<f64>>,
    #[serde(deserialize_with = "nullable::null_as_default")]
    pub heart_rates: HashMap<String, Option<f64>>,
}

/// The merged view of one day across all sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegratedDailySummary {
    pub avg_heart_rate: Option<f64>,
    pub total_active_time: f64,
    pub total_calories: f64,
    pub total_steps: u64,
    /// Sorted, duplicate-free union of every source's slot keys.
    pub time_slots: Vec<String>,
    /// Aligned with `time_slots`.
    pub activity_level: Vec<f64>,
    /// Aligned with `time_slots`; `None` where no source reported a value.
    pub heart_rate: Vec<Option<f64>>,
}

/// Whether the backend currently has a session open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active { session_id: u64 },
    NoActiveSession,
}

/// Latest state of the live session, as returned by `/api/sessions/current`.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSessionSnapshot {
    pub status: SessionStatus,
    pub start_time: Option<NaiveDateTime>,
    pub current_speed_kmh: f64,
    pub current_rpm: f64,
    pub current_mets: f64,
    pub session_distance_km: f64,
    pub session_calories: f64,
    pub session_time_seconds: u64,
}

impl LiveSessionSnapshot {
    pub fn no_active_session() -> Self {
        Self {
            status: SessionStatus::NoActiveSession,
            start_time: None,
            current_speed_kmh: 0.0,
            current_rpm: 0.0,
            current_mets: 0.0,
            session_distance_km: 0.0,
            session_calories: 0.0,
            session_time_seconds: 0,
        }
    }

    pub fn session_id(&self) -> Option<u64> {
        match self.status {
            SessionStatus::Active { session_id } => Some(session_id),
            SessionStatus::NoActiveSession => None,
        }
    }

    /// Values for the gauges and the distance/calories/time readouts.
    pub fn readout(&self) -> LiveReadout {
        LiveReadout {
            speed_kmh: self.current_speed_kmh,
            rpm: self.current_rpm,
            mets: self.current_mets,
            distance_km: self.session_distance_km,
            calories_kcal: self.session_calories,
            time_seconds: self.session_time_seconds,
        }
    }
}

/// What the live part of the dashboard displays.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LiveReadout {
    pub speed_kmh: f64,
    pub rpm: f64,
    pub mets: f64,
    pub distance_km: f64,
    pub calories_kcal: f64,
    pub time_seconds: u64,
}

/// One point of the recent-history chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySample {
    #[serde(with = "crate::domain::timestamp")]
    pub timestamp: NaiveDateTime,
    pub speed_kmh: f64,
    pub rpm: f64,
}

/// One 15-minute bucket of `/api/sessions/daily`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBucket {
    #[serde(with = "crate::domain::timestamp")]
    pub time: NaiveDateTime,
    pub avg_speed: f64,
    pub avg_rpm: f64,
    #[serde(default)]
    pub total_distance: Option<f64>,
    #[serde(default)]
    pub total_calories: Option<f64>,
    #[serde(default)]
    pub point_count: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CumulativeStats {
    pub total_time_seconds: u64,
    pub total_distance_km: f64,
    pub total_calories_kcal: f64,
}

/// A calendar entry from `/api/sessions/dates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSpan {
    pub id: u64,
    #[serde(with = "crate::domain::timestamp")]
    pub start_time: NaiveDateTime,
    #[serde(default, with = "crate::domain::timestamp::option")]
    pub end_time: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    #[serde(with = "crate::domain::timestamp")]
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub speed_kmh: f64,
    #[serde(default)]
    pub rpm: f64,
    #[serde(default)]
    pub distance_km: f64,
    #[serde(default)]
    pub calories_kcal: f64,
    #[serde(default)]
    pub time_seconds: u64,
    #[serde(default)]
    pub mets: f64,
}

/// Full record of one session, from `/api/sessions/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDetail {
    pub id: u64,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(with = "crate::domain::timestamp")]
    pub start_time: NaiveDateTime,
    #[serde(default, with = "crate::domain::timestamp::option")]
    pub end_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub total_time_seconds: u64,
    #[serde(default)]
    pub total_distance_km: f64,
    #[serde(default)]
    pub total_calories_kcal: f64,
    #[serde(default)]
    pub average_speed_kmh: f64,
    #[serde(default)]
    pub average_rpm: f64,
    #[serde(default)]
    pub average_mets: f64,
    #[serde(default)]
    pub data_points: Vec<DataPoint>,
}

/// Result of pushing a session to one sync target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetOutcome {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Per-target outcome of a sync. Targets succeed or fail independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncResult {
    pub google_fit: TargetOutcome,
    pub health_connect: TargetOutcome,
}

impl SyncResult {
    pub fn targets(&self) -> [(SyncTarget, &TargetOutcome); 2] {
        [
            (SyncTarget::GoogleFit, &self.google_fit),
            (SyncTarget::HealthConnect, &self.health_connect),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTarget {
    GoogleFit,
    HealthConnect,
}

impl SyncTarget {
    pub fn display_name(self) -> &'static str {
        match self {
            SyncTarget::GoogleFit => "Google Fit",
            SyncTarget::HealthConnect => "Health Connect",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndSessionResponse {
    pub success: bool,
    #[serde(default)]
    pub sync_result: Option<SyncResult>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Severity of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A non-blocking message for the user (the dashboard's toasts).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Info, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Error, message: message.into() }
    }
}

/// Cadences and options for the live dashboard.
///
/// Derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub live_interval: Duration,
    pub summary_interval: Duration,
    pub cumulative_interval: Duration,
    /// Length of the trailing window fetched for the history chart.
    pub history_window: chrono::Duration,
    /// Passed to `end_session` when a session finishes.
    pub auto_sync: bool,
    /// Stop the loop after this long; `None` runs until killed.
    pub run_for: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            live_interval: Duration::from_secs(1),
            summary_interval: Duration::from_secs(60),
            cumulative_interval: Duration::from_secs(60),
            history_window: chrono::Duration::minutes(30),
            auto_sync: true,
            run_for: None,
        }
    }
}
