//! CSV row appended in file mode
//!
//! Column order: timestamp, download mean, download trimmed mean, upload
//! mean, upload trimmed mean, runs, drop-outliers flag.

use crate::{
    error::Result,
    models::{Direction, Report},
    stats::Aggregator,
};
use std::fmt;

/// Minute-precision timestamp of the first column
pub const ROW_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One line of the results file
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    pub timestamp: String,
    pub download_mean: f64,
    pub download_trimmed: f64,
    pub upload_mean: f64,
    pub upload_trimmed: f64,
    pub runs: usize,
    pub drop_outliers: bool,
}

impl CsvRow {
    /// Build the row; trimmed columns always drop one min and one max
    pub fn from_report(report: &Report) -> Result<Self> {
        let aggregator = Aggregator::new(report.drop_outliers);
        let (download_mean, download_trimmed) =
            aggregator.file_columns(&report.measurements, Direction::Download)?;
        let (upload_mean, upload_trimmed) =
            aggregator.file_columns(&report.measurements, Direction::Upload)?;

        Ok(Self {
            timestamp: report.completed_at.format(ROW_TIMESTAMP_FORMAT).to_string(),
            download_mean,
            download_trimmed,
            upload_mean,
            upload_trimmed,
            runs: report.runs(),
            drop_outliers: report.drop_outliers,
        })
    }
}

impl fmt::Display for CsvRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Python-style booleans keep old result files readable by the same tooling
        let flag = if self.drop_outliers { "True" } else { "False" };
        write!(
            f,
            "{},{:.2},{:.2},{:.2},{:.2},{},{}",
            self.timestamp,
            self.download_mean,
            self.download_trimmed,
            self.upload_mean,
            self.upload_trimmed,
            self.runs,
            flag
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MeasurementSet, RunResult};
    use chrono::{Local, TimeZone};

    fn report(pairs: &[(f64, f64)], drop_outliers: bool) -> Report {
        let set: MeasurementSet = pairs.iter().map(|&(d, u)| RunResult::new(d, u)).collect();
        let started = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 59).unwrap();
        Report::new(started, "4711", set, drop_outliers).unwrap()
    }

    #[test]
    fn test_row_layout() {
        let row = CsvRow::from_report(&report(&[(10.0, 2.0), (20.0, 4.0), (60.0, 9.0)], false)).unwrap();
        assert_eq!(row.to_string(), "2024-03-09 14:05,30.00,20.00,5.00,4.00,3,False");
    }

    #[test]
    fn test_trimmed_columns_ignore_threshold() {
        // Four runs: the text report would not trim, the file row does
        let row = CsvRow::from_report(&report(
            &[(10.0, 1.0), (20.0, 2.0), (30.0, 3.0), (100.0, 10.0)],
            true,
        ))
        .unwrap();
        assert_eq!(row.download_mean, 40.0);
        assert_eq!(row.download_trimmed, 25.0);
        assert!(row.to_string().ends_with(",4,True"));
    }

    #[test]
    fn test_too_few_runs_for_trimmed_columns() {
        let err = CsvRow::from_report(&report(&[(10.0, 1.0), (20.0, 2.0)], false)).unwrap_err();
        assert!(matches!(err, crate::AppError::Statistics(_)));
    }
}
