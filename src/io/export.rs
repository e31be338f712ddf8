//! Read/write integrated daily summary JSON files.
//!
//! The file carries the merged summary plus which sources contributed, so a
//! saved day can be re-printed or compared later without the backend.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{DataSource, IntegratedDailySummary};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryFile {
    pub tool: String,
    pub date: NaiveDate,
    /// Sources that answered; a source that failed to load is absent.
    pub sources: Vec<DataSource>,
    pub summary: IntegratedDailySummary,
}

impl SummaryFile {
    pub fn new(date: NaiveDate, sources: Vec<DataSource>, summary: IntegratedDailySummary) -> Self {
        Self {
            tool: "fit2go".to_string(),
            date,
            sources,
            summary,
        }
    }
}

/// Write a summary JSON file.
pub fn write_summary_json(path: &Path, file: &SummaryFile) -> Result<(), AppError> {
    let out = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create summary JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(out, file).map_err(|e| AppError::io(format!("Failed to write summary JSON: {e}")))?;
    Ok(())
}

/// Read a summary JSON file.
pub fn read_summary_json(path: &Path) -> Result<SummaryFile, AppError> {
    let input = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open summary JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(input).map_err(|e| AppError::malformed(format!("Invalid summary JSON: {e}")))
}
