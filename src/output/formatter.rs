//! Core formatting trait and the plain text implementation

use crate::{
    error::Result,
    models::{Direction, Report},
    stats::Summary,
};

/// Timestamp shown in the text report header
pub const HEADER_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Main trait for text report formatting
pub trait OutputFormatter {
    /// "Test started at ..." and "Averaging results over ..." lines
    fn format_header(&self, report: &Report) -> Result<String>;

    /// One "<Direction> average...: <value>" line
    fn format_summary(&self, summary: &Summary) -> Result<String>;

    /// Full text report, one line per entry, Download before Upload
    fn format_report(&self, report: &Report) -> Result<String> {
        let mut lines = vec![self.format_header(report)?];
        for direction in Direction::ALL {
            if let Some(summary) = report.summary(direction) {
                lines.push(self.format_summary(summary)?);
            }
        }
        Ok(lines.join("\n"))
    }
}

/// Plain text formatter implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormatter;

impl PlainFormatter {
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn header_lines(report: &Report) -> (String, String) {
    (
        format!("Test started at {}", report.completed_at.format(HEADER_TIMESTAMP_FORMAT)),
        format!("Averaging results over {} runs", report.runs()),
    )
}

pub(crate) fn summary_parts(summary: &Summary) -> (String, String) {
    (
        format!("{} average{}:", summary.direction.name(), summary.annotation()),
        format!("{:.2}", summary.average()),
    )
}

impl OutputFormatter for PlainFormatter {
    fn format_header(&self, report: &Report) -> Result<String> {
        let (started, averaging) = header_lines(report);
        Ok(format!("{}\n{}", started, averaging))
    }

    fn format_summary(&self, summary: &Summary) -> Result<String> {
        let (label, value) = summary_parts(summary);
        Ok(format!("{} {}", label, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MeasurementSet, RunResult};
    use chrono::{Local, TimeZone};

    fn report(pairs: &[(f64, f64)], drop_outliers: bool) -> Report {
        let set: MeasurementSet = pairs.iter().map(|&(d, u)| RunResult::new(d, u)).collect();
        let started = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        Report::new(started, "4711", set, drop_outliers).unwrap()
    }

    #[test]
    fn test_plain_report_three_runs() {
        let report = report(&[(10.0, 2.0), (20.0, 4.0), (30.0, 6.0)], false);
        let text = PlainFormatter::new().format_report(&report).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Test started at 2024-03-09 14:05:07.000000");
        assert_eq!(lines[1], "Averaging results over 3 runs");
        assert_eq!(lines[2], "Download average: 20.00");
        assert_eq!(lines[3], "Upload average: 4.00");
    }

    #[test]
    fn test_plain_report_with_dropped_extremes() {
        let report = report(
            &[(10.0, 1.0), (20.0, 2.0), (30.0, 3.0), (40.0, 4.0), (100.0, 5.0)],
            true,
        );
        let text = PlainFormatter::new().format_report(&report).unwrap();

        assert!(text.contains("Averaging results over 5 runs"));
        assert!(text.contains("Download average (dropping highest and lowest): 30.00"));
        assert!(text.contains("Upload average (dropping highest and lowest): 3.00"));
    }

    #[test]
    fn test_drop_outliers_below_threshold_has_no_annotation() {
        let report = report(&[(10.0, 1.0), (20.0, 2.0), (30.0, 3.0), (40.0, 4.0)], true);
        let text = PlainFormatter::new().format_report(&report).unwrap();

        assert!(text.contains("Download average: 25.00"));
        assert!(!text.contains("dropping"));
    }
}
