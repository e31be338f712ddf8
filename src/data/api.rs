//! Fit2Go backend HTTP client.

use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use log::debug;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::domain::{
    CumulativeStats, DailyBucket, DataSource, EndSessionResponse, HistorySample, IntegratedDailySummary,
    LiveSessionSnapshot, SessionDetail, SessionSpan, SessionStatus, SourceDailyRecord, SyncResult,
};
use crate::error::AppError;

const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const TOKEN_HEADER: &str = "X-API-Token";
const NO_ACTIVE_SESSION: &str = "no_active_session";

/// Connection settings for the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Read settings from the environment (and `.env` if present).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup.
    ///
    /// Recognised keys: `FIT2GO_BASE_URL`, `FIT2GO_API_TOKEN`, `FIT2GO_TIMEOUT_SECS`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let base_url = lookup("FIT2GO_BASE_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(AppError::config(format!(
                "FIT2GO_BASE_URL must start with http:// or https:// (got '{base_url}')."
            )));
        }

        let api_token = lookup("FIT2GO_API_TOKEN")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let timeout_secs = match lookup("FIT2GO_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| AppError::config(format!("Invalid FIT2GO_TIMEOUT_SECS '{raw}'.")))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        self
    }
}

/// The calls the live dashboard makes on each refresh cycle.
///
/// `ApiClient` is the real implementation; tests substitute an in-memory fake.
pub trait DashboardApi {
    fn current_session(&self) -> Result<LiveSessionSnapshot, AppError>;
    fn history(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<Vec<HistorySample>, AppError>;
    fn daily_stats(&self, date: Option<NaiveDate>) -> Result<Vec<DailyBucket>, AppError>;
    fn cumulative(&self) -> Result<CumulativeStats, AppError>;
    fn end_session(&self, session_id: u64, auto_sync: bool) -> Result<EndSessionResponse, AppError>;
    fn sync_session(&self, session_id: u64) -> Result<SyncResult, AppError>;
}

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.api_token {
            let value = HeaderValue::from_str(token)
                .map_err(|_| AppError::config("FIT2GO_API_TOKEN contains invalid header characters."))?;
            headers.insert(TOKEN_HEADER, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/sessions/dates`
    pub fn session_dates(&self) -> Result<Vec<SessionSpan>, AppError> {
        self.get_json("/api/sessions/dates", &[])
    }

    /// `GET /api/sessions/{id}`
    pub fn session_detail(&self, session_id: u64) -> Result<SessionDetail, AppError> {
        self.get_json(&format!("/api/sessions/{session_id}"), &[])
    }

    /// `GET /api/daily/{source}/{date}`
    pub fn source_daily(&self, source: DataSource, date: NaiveDate) -> Result<SourceDailyRecord, AppError> {
        self.get_json(&format!("/api/daily/{}/{}", source.path_segment(), date_key(date)), &[])
    }

    /// `GET /api/health/integrated/{date}`
    pub fn integrated(&self, date: NaiveDate) -> Result<IntegratedDailySummary, AppError> {
        self.get_json(&format!("/api/health/integrated/{}", date_key(date)), &[])
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, AppError> {
        debug!("GET {path} {query:?}");
        let req = self.client.get(self.url(path)).query(query);
        let (status, body) = send(req, path)?;
        if !status.is_success() {
            return Err(AppError::network(format!("GET {path} failed with status {status}.")));
        }
        decode(&body, path)
    }

    /// POST where a non-2xx answer may still carry a typed failure body.
    fn post_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, AppError> {
        debug!("POST {path} {query:?}");
        let req = self.client.post(self.url(path)).query(query);
        let (status, body) = send(req, path)?;
        if status.is_success() {
            return decode(&body, path);
        }
        serde_json::from_str(&body)
            .map_err(|_| AppError::network(format!("POST {path} failed with status {status}.")))
    }
}

impl DashboardApi for ApiClient {
    /// `GET /api/sessions/current`
    fn current_session(&self) -> Result<LiveSessionSnapshot, AppError> {
        let wire: CurrentSessionWire = self.get_json("/api/sessions/current", &[])?;
        wire.into_snapshot()
    }

    /// `GET /api/sessions/history?start=..&end=..`
    fn history(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<Vec<HistorySample>, AppError> {
        self.get_json(
            "/api/sessions/history",
            &[("start", iso_timestamp(start)), ("end", iso_timestamp(end))],
        )
    }

    /// `GET /api/sessions/daily[?date=YYYY-MM-DD]`
    fn daily_stats(&self, date: Option<NaiveDate>) -> Result<Vec<DailyBucket>, AppError> {
        match date {
            Some(date) => self.get_json("/api/sessions/daily", &[("date", date_key(date))]),
            None => self.get_json("/api/sessions/daily", &[]),
        }
    }

    /// `GET /api/sessions/cumulative`
    fn cumulative(&self) -> Result<CumulativeStats, AppError> {
        self.get_json("/api/sessions/cumulative", &[])
    }

    /// `POST /api/sessions/{id}/end?auto_sync=..`
    fn end_session(&self, session_id: u64, auto_sync: bool) -> Result<EndSessionResponse, AppError> {
        self.post_json(
            &format!("/api/sessions/{session_id}/end"),
            &[("auto_sync", auto_sync.to_string())],
        )
    }

    /// `POST /api/sessions/{id}/sync`
    fn sync_session(&self, session_id: u64) -> Result<SyncResult, AppError> {
        self.post_json(&format!("/api/sessions/{session_id}/sync"), &[])
    }
}

fn send(req: RequestBuilder, path: &str) -> Result<(reqwest::StatusCode, String), AppError> {
    let resp = req
        .send()
        .map_err(|e| AppError::network(format!("Request to {path} failed: {e}")))?;
    let status = resp.status();
    let body = resp
        .text()
        .map_err(|e| AppError::network(format!("Failed to read response from {path}: {e}")))?;
    Ok((status, body))
}

fn decode<T: DeserializeOwned>(body: &str, path: &str) -> Result<T, AppError> {
    serde_json::from_str(body).map_err(|e| AppError::malformed(format!("Unexpected response from {path}: {e}")))
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn iso_timestamp(ts: NaiveDateTime) -> String {
    ts.and_utc().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Raw `/api/sessions/current` body.
///
/// The backend answers either `{"status": "no_active_session"}` or the
/// session fields without a status.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CurrentSessionWire {
    status: Option<String>,
    session_id: Option<u64>,
    #[serde(with = "crate::domain::timestamp::option")]
    start_time: Option<NaiveDateTime>,
    current_speed_kmh: Option<f64>,
    current_rpm: Option<f64>,
    current_mets: Option<f64>,
    total_distance_km: Option<f64>,
    total_calories_kcal: Option<f64>,
    total_time_seconds: Option<f64>,
}

impl CurrentSessionWire {
    fn into_snapshot(self) -> Result<LiveSessionSnapshot, AppError> {
        match self.status.as_deref() {
            Some(NO_ACTIVE_SESSION) => return Ok(LiveSessionSnapshot::no_active_session()),
            None | Some("active") => {}
            Some(other) => {
                return Err(AppError::malformed(format!("Unknown session status '{other}'.")));
            }
        }

        let session_id = self
            .session_id
            .ok_or_else(|| AppError::malformed("Current session response has neither status nor session_id."))?;

        Ok(LiveSessionSnapshot {
            status: SessionStatus::Active { session_id },
            start_time: self.start_time,
            current_speed_kmh: self.current_speed_kmh.unwrap_or(0.0),
            current_rpm: self.current_rpm.unwrap_or(0.0),
            current_mets: self.current_mets.unwrap_or(0.0),
            session_distance_km: self.total_distance_km.unwrap_or(0.0),
            session_calories: self.total_calories_kcal.unwrap_or(0.0),
            session_time_seconds: self.total_time_seconds.unwrap_or(0.0).max(0.0) as u64,
        })
    }
}

/// Today's date in UTC, the default for date-keyed commands.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
