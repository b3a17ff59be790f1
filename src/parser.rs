//! Extraction of Download/Upload figures from speedtest-cli output
//!
//! speedtest-cli prints lines such as `Download: 93.45 Mbit/s`. The value is
//! always the second whitespace-separated field of the first line that
//! starts with the label.

use crate::{
    error::{AppError, Result},
    models::measurement::{Direction, RunResult},
};

/// Why a label could not be turned into a speed
#[derive(Debug, Clone, PartialEq)]
pub enum SpeedLookup {
    Found(f64),
    MissingLabel,
    MissingValue,
    InvalidValue(String),
}

/// Inspect the first line starting with `label`
pub fn lookup_speed(output: &str, label: &str) -> SpeedLookup {
    let line = match output.lines().find(|line| line.starts_with(label)) {
        Some(line) => line,
        None => return SpeedLookup::MissingLabel,
    };

    let field = match line.split_whitespace().nth(1) {
        Some(field) => field,
        None => return SpeedLookup::MissingValue,
    };

    match field.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => SpeedLookup::Found(value),
        _ => SpeedLookup::InvalidValue(field.to_string()),
    }
}

/// Speed reported on the first line starting with `label`
pub fn get_speed(output: &str, label: &str) -> Option<f64> {
    match lookup_speed(output, label) {
        SpeedLookup::Found(value) => Some(value),
        _ => None,
    }
}

/// Parse one direction of a run, reporting which run and label failed
pub fn parse_direction(output: &str, direction: Direction, run: usize) -> Result<f64> {
    let label = direction.label();
    match lookup_speed(output, label) {
        SpeedLookup::Found(value) => Ok(value),
        SpeedLookup::MissingLabel => Err(AppError::parse(label, run, "line not found in tool output")),
        SpeedLookup::MissingValue => Err(AppError::parse(label, run, "line has no value field")),
        SpeedLookup::InvalidValue(field) => Err(AppError::parse(
            label,
            run,
            format!("value '{}' is not a valid speed", field),
        )),
    }
}

/// Parse the captured output of run number `run` (1-based)
pub fn parse_run(output: &str, run: usize) -> Result<RunResult> {
    let download = parse_direction(output, Direction::Download, run)?;
    let upload = parse_direction(output, Direction::Upload, run)?;
    Ok(RunResult::new(download, upload))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_OUTPUT: &str = "\
Retrieving speedtest.net configuration...
Testing from Example ISP (203.0.113.7)...
Retrieving speedtest.net server list...
Selecting best server based on ping...
Hosted by Example Hosting (Berlin) [3.21 km]: 12.345 ms
Testing download speed................................................................................
Download: 93.45 Mbit/s
Testing upload speed......................................................................................................
Upload: 11.02 Mbit/s
";

    #[test]
    fn test_get_speed_download() {
        let output = "Download: 42.7 Mbit/s\nUpload: 3.1 Mbit/s";
        assert_eq!(get_speed(output, "Download:"), Some(42.7));
        assert_eq!(get_speed(output, "Upload:"), Some(3.1));
    }

    #[test]
    fn test_parse_realistic_output() {
        let result = parse_run(SAMPLE_OUTPUT, 1).unwrap();
        assert_eq!(result.download, 93.45);
        assert_eq!(result.upload, 11.02);
    }

    #[test]
    fn test_label_must_start_the_line() {
        // "Testing download speed" mentions the direction but is not the result line
        let output = "Testing Download: speed\n  Download: 5.0 Mbit/s";
        assert_eq!(lookup_speed(output, "Download:"), SpeedLookup::MissingLabel);
    }

    #[test]
    fn test_first_matching_line_wins() {
        let output = "Download: 1.5 Mbit/s\nDownload: 99.0 Mbit/s";
        assert_eq!(get_speed(output, "Download:"), Some(1.5));
    }

    #[test]
    fn test_missing_label_is_parse_error() {
        let output = "Download: 10.0 Mbit/s\nCannot retrieve upload";
        match parse_run(output, 2) {
            Err(AppError::Parse { label, run, .. }) => {
                assert_eq!(label, "Upload:");
                assert_eq!(run, 2);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_value_is_parse_error() {
        let output = "Download: fast Mbit/s\nUpload: 1.0 Mbit/s";
        assert_eq!(
            lookup_speed(output, "Download:"),
            SpeedLookup::InvalidValue("fast".to_string())
        );
        let err = parse_run(output, 3).unwrap_err();
        assert!(matches!(err, AppError::Parse { run: 3, .. }));
        assert!(err.to_string().contains("fast"));
    }

    #[test]
    fn test_missing_value_field() {
        assert_eq!(lookup_speed("Download:", "Download:"), SpeedLookup::MissingValue);
        assert!(parse_direction("Download:\n", Direction::Download, 1).is_err());
    }

    #[test]
    fn test_negative_and_non_finite_rejected() {
        assert!(get_speed("Download: -3.0 Mbit/s", "Download:").is_none());
        assert!(get_speed("Download: NaN Mbit/s", "Download:").is_none());
        assert!(get_speed("Download: inf Mbit/s", "Download:").is_none());
    }

    #[test]
    fn test_empty_output() {
        assert!(matches!(parse_run("", 1), Err(AppError::Parse { .. })));
    }
}
