//! Shared "daily summary" workflow used by the `day` command.
//!
//! fetch each source -> tolerate failures -> integrate
//!
//! A source that cannot be fetched or decoded is logged and treated as an
//! empty record, so one broken source never hides the others.

use chrono::NaiveDate;
use log::warn;

use crate::aggregate::integrate;
use crate::domain::{DataSource, IntegratedDailySummary, SourceDailyRecord};
use crate::error::AppError;

/// All computed outputs of a single daily merge.
#[derive(Debug, Clone)]
pub struct DailyOutput {
    pub date: NaiveDate,
    /// Sources that answered successfully.
    pub loaded: Vec<DataSource>,
    pub failed: Vec<(DataSource, AppError)>,
    pub summary: IntegratedDailySummary,
}

/// Fetch `sources` for `date` through `fetch` and merge them.
pub fn run_daily<F>(date: NaiveDate, sources: &[DataSource], fetch: F) -> DailyOutput
where
    F: Fn(DataSource, NaiveDate) -> Result<SourceDailyRecord, AppError>,
{
    let mut records = Vec::with_capacity(sources.len());
    let mut loaded = Vec::new();
    let mut failed = Vec::new();

    for &source in sources {
        match fetch(source, date) {
            Ok(record) => {
                loaded.push(source);
                records.push(record);
            }
            Err(err) => {
                warn!("{} data for {date} unavailable: {err}", source.display_name());
                failed.push((source, err));
                records.push(SourceDailyRecord::default());
            }
        }
    }

    DailyOutput {
        date,
        loaded,
        failed,
        summary: integrate(&records),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn failing_source_does_not_break_the_day() {
        let out = run_daily(date(), &DataSource::ALL, |source, _| match source {
            DataSource::Fit2Go => Ok(SourceDailyRecord {
                avg_heart_rate: Some(120.0),
                duration: Some(30.0),
                steps: Some(1000),
                ..Default::default()
            }),
            DataSource::GoogleFit => Err(AppError::network("GET /api/daily/googlefit failed with status 500.")),
            DataSource::HealthConnect => Ok(SourceDailyRecord {
                avg_heart_rate: Some(100.0),
                duration: Some(10.0),
                steps: Some(500),
                ..Default::default()
            }),
        });

        assert_eq!(out.loaded, vec![DataSource::Fit2Go, DataSource::HealthConnect]);
        assert_eq!(out.failed.len(), 1);
        assert_eq!(out.failed[0].0, DataSource::GoogleFit);
        assert_eq!(out.summary.total_steps, 1500);
        assert!((out.summary.avg_heart_rate.unwrap() - 115.0).abs() < 1e-9);
    }

    #[test]
    fn null_collections_keep_the_source_totals() {
        let out = run_daily(date(), &[DataSource::GoogleFit], |_, _| {
            serde_json::from_str::<SourceDailyRecord>(
                r#"{"calories": 300, "steps": 1000, "timeSlots": null, "activityLevels": null}"#,
            )
            .map_err(|e| AppError::malformed(e.to_string()))
        });
        assert_eq!(out.loaded, vec![DataSource::GoogleFit]);
        assert!(out.failed.is_empty());
        assert_eq!(out.summary.total_calories, 300.0);
        assert_eq!(out.summary.total_steps, 1000);
    }

    #[test]
    fn all_sources_failing_yields_empty_summary() {
        let out = run_daily(date(), &DataSource::ALL, |_, _| Err(AppError::network("offline")));
        assert!(out.loaded.is_empty());
        assert_eq!(out.summary, IntegratedDailySummary::default());
    }
}
