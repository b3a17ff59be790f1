//! Report emission
//!
//! A finished report either goes to stdout as a short text summary or is
//! appended to a results file as a single CSV row.

mod colored;
mod csv;
mod formatter;

pub use self::colored::{ColorScheme, ColoredFormatter};
pub use self::csv::{CsvRow, ROW_TIMESTAMP_FORMAT};
pub use self::formatter::{OutputFormatter, PlainFormatter, HEADER_TIMESTAMP_FORMAT};

use crate::{
    error::{AppError, ErrorContext, Result},
    models::{Config, Report},
};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool) -> Box<dyn OutputFormatter> {
        if enable_color {
            Box::new(ColoredFormatter::new(true))
        } else {
            Box::new(PlainFormatter::new())
        }
    }
}

/// Where a report ends up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportDestination {
    Stdout,
    File(PathBuf),
}

impl ReportDestination {
    pub fn from_config(config: &Config) -> Self {
        match &config.outfile {
            Some(path) => ReportDestination::File(path.clone()),
            None => ReportDestination::Stdout,
        }
    }
}

/// Main output coordinator that handles report display
pub struct OutputCoordinator {
    formatter: Box<dyn OutputFormatter>,
    destination: ReportDestination,
}

impl OutputCoordinator {
    pub fn new(formatter: Box<dyn OutputFormatter>, destination: ReportDestination) -> Self {
        Self { formatter, destination }
    }

    /// Coordinator for the given configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            OutputFormatterFactory::create_formatter(config.enable_color),
            ReportDestination::from_config(config),
        )
    }

    pub fn destination(&self) -> &ReportDestination {
        &self.destination
    }

    /// Render the text report without emitting it
    pub fn render_text(&self, report: &Report) -> Result<String> {
        self.formatter.format_report(report)
    }

    /// Emit the report to its destination
    pub fn emit(&self, report: &Report) -> Result<()> {
        match &self.destination {
            ReportDestination::Stdout => {
                let text = self.render_text(report)?;
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                writeln!(handle, "{}", text)
                    .and_then(|_| handle.flush())
                    .map_err(|e| AppError::io(format!("Failed to write report to stdout: {}", e)))
            }
            ReportDestination::File(path) => {
                let row = CsvRow::from_report(report)?;
                append_row(path, &row)
            }
        }
    }
}

/// Append one row to `path`, creating the file if needed. Existing content is never touched.
pub fn append_row(path: &Path, row: &CsvRow) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AppError::io(format!("Cannot open {} for appending: {}", path.display(), e)))?;

    writeln!(file, "{}", row).with_context(|| format!("Failed to append to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MeasurementSet, RunResult};
    use chrono::Local;
    use std::fs;
    use tempfile::TempDir;

    fn report(drop_outliers: bool) -> Report {
        let set: MeasurementSet = vec![
            RunResult::new(10.0, 2.0),
            RunResult::new(20.0, 4.0),
            RunResult::new(30.0, 6.0),
        ]
        .into_iter()
        .collect();
        Report::new(Local::now(), "4711", set, drop_outliers).unwrap()
    }

    #[test]
    fn test_destination_from_config() {
        let mut config = Config::default();
        assert_eq!(ReportDestination::from_config(&config), ReportDestination::Stdout);

        config.outfile = Some(PathBuf::from("results.csv"));
        assert_eq!(
            ReportDestination::from_config(&config),
            ReportDestination::File(PathBuf::from("results.csv"))
        );
    }

    #[test]
    fn test_file_mode_appends_without_overwriting() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.csv");
        fs::write(&path, "existing line\n").unwrap();

        let coordinator = OutputCoordinator::new(
            Box::new(PlainFormatter::new()),
            ReportDestination::File(path.clone()),
        );
        coordinator.emit(&report(false)).unwrap();
        coordinator.emit(&report(true)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "existing line");
        assert!(lines[1].ends_with(",20.00,20.00,4.00,4.00,3,False"));
        assert!(lines[2].ends_with(",3,True"));
    }

    #[test]
    fn test_file_mode_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("new.csv");

        let coordinator = OutputCoordinator::new(
            Box::new(PlainFormatter::new()),
            ReportDestination::File(path.clone()),
        );
        coordinator.emit(&report(false)).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_unwritable_path_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing-dir").join("results.csv");

        let err = OutputCoordinator::new(Box::new(PlainFormatter::new()), ReportDestination::File(path))
            .emit(&report(false))
            .unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }
}
