//! Configuration validation utilities and rules
//!
//! `Config::validate` rejects configurations that cannot work. The checks
//! here only produce warnings for configurations that run but probably do
//! not do what the user meant.

use crate::{error::Result, models::Config, stats::TRIM_THRESHOLD};
use colored::*;

/// A typical speedtest-cli run finishes in 20 to 40 seconds
const TYPICAL_RUN_SECS: u64 = 30;

/// Configuration validator with advanced validation rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration with comprehensive checks
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_averaging(config));
        warnings.extend(Self::validate_timing(config));
        warnings.extend(Self::validate_server(config));
        warnings.extend(Self::validate_outfile(config));

        Ok(warnings)
    }

    /// Run count against the trimming rules
    fn validate_averaging(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let runs = config.runs as usize;

        if config.drop_outliers && runs <= TRIM_THRESHOLD && !config.is_file_mode() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "--drop-outliers has no effect with {} runs; more than {} are needed",
                    runs, TRIM_THRESHOLD
                ),
            ));
        }

        if runs < 3 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("An average over {} run(s) may not be representative (recommended: >= 3)", runs),
            ));
        }

        warnings
    }

    /// Timeout and total duration estimates
    fn validate_timing(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if let Some(timeout) = config.timeout_seconds {
            if timeout < TYPICAL_RUN_SECS {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!("Timeout of {}s is shorter than a typical speedtest run", timeout),
                ));
            }
        }

        let estimate = config.runs as u64 * TYPICAL_RUN_SECS;
        if estimate > 600 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("{} runs will take roughly {} minutes", config.runs, estimate / 60),
            ));
        }

        warnings
    }

    /// Explicit server id and auto-selection endpoint
    fn validate_server(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        match &config.server {
            Some(server) => {
                if !server.trim().chars().all(|c| c.is_ascii_digit()) {
                    warnings.push(ValidationWarning::new(
                        ValidationLevel::Warning,
                        format!("Server id '{}' is not numeric; speedtest.net ids usually are", server),
                    ));
                }
            }
            None => {
                if config.servers_url.starts_with("http://") {
                    warnings.push(ValidationWarning::new(
                        ValidationLevel::Info,
                        format!("Server list is fetched over plain HTTP: {}", config.servers_url),
                    ));
                }
            }
        }

        warnings
    }

    /// Output file location
    fn validate_outfile(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if let Some(path) = &config.outfile {
            if path.is_dir() {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Error,
                    format!("Output path {} is a directory; appending will fail", path.display()),
                ));
            } else if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    warnings.push(ValidationWarning::new(
                        ValidationLevel::Error,
                        format!("Directory {} does not exist; appending will fail", parent.display()),
                    ));
                }
            }
        }

        warnings
    }
}

/// Validation warning levels
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    Info,
    Warning,
    Error,
}

impl ValidationLevel {
    /// Get display string for level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    /// Get color for terminal display
    pub fn color(&self) -> Color {
        match self {
            Self::Info => Color::Blue,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    /// Create a new validation warning
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        if use_color {
            format!("{} {}", tag.color(self.level.color()), self.message)
        } else {
            format!("{} {}", tag, self.message)
        }
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
