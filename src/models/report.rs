//! Final report assembled once all runs have completed

use crate::{
    error::{AppError, Result},
    models::measurement::{Direction, MeasurementSet},
    stats::{Aggregator, Summary},
};
use chrono::{DateTime, Local};

/// Everything the reporter needs, built once at the end of the pipeline
#[derive(Debug, Clone)]
pub struct Report {
    /// When the last run finished; stamps both the text header and the CSV row
    pub completed_at: DateTime<Local>,
    /// Server every run was measured against
    pub server_id: String,
    /// Whether outlier dropping was requested
    pub drop_outliers: bool,
    /// Raw per-run values
    pub measurements: MeasurementSet,
    /// Per-direction summaries, Download first
    pub summaries: Vec<Summary>,
}

impl Report {
    /// Aggregate a finished measurement set into a report
    pub fn new(
        completed_at: DateTime<Local>,
        server_id: impl Into<String>,
        measurements: MeasurementSet,
        drop_outliers: bool,
    ) -> Result<Self> {
        if measurements.is_empty() {
            return Err(AppError::statistics("No completed runs to report"));
        }
        let summaries = Aggregator::new(drop_outliers).summarize(&measurements)?;

        Ok(Self {
            completed_at,
            server_id: server_id.into(),
            drop_outliers,
            measurements,
            summaries,
        })
    }

    /// Number of completed runs
    pub fn runs(&self) -> usize {
        self.measurements.len()
    }

    /// Summary for one direction
    pub fn summary(&self, direction: Direction) -> Option<&Summary> {
        self.summaries.iter().find(|s| s.direction == direction)
    }
}
