//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env file if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    /// Load a specific env file if it exists; variables already set win
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                eprintln!("[CONFIG] Loaded configuration from {}", path.display());
            }
        } else if debug {
            eprintln!("[CONFIG] No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "SPEEDTEST_SERVER" => {
                if value.is_empty() {
                    return Err(AppError::config("SPEEDTEST_SERVER cannot be empty"));
                }
            }
            "SPEEDTEST_RUNS" => {
                let runs: u32 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid SPEEDTEST_RUNS value '{}': {}", value, e)))?;
                if runs == 0 || runs > crate::defaults::MAX_RUNS {
                    return Err(AppError::config(format!(
                        "SPEEDTEST_RUNS must be between 1 and {}, got: {}",
                        crate::defaults::MAX_RUNS,
                        runs
                    )));
                }
            }
            "SPEEDTEST_DROP_OUTLIERS" | "ENABLE_COLOR" => {
                value.parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
            }
            "SPEEDTEST_TIMEOUT" => {
                let timeout: u64 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid SPEEDTEST_TIMEOUT value '{}': {}", value, e)))?;
                if timeout == 0 || timeout > crate::defaults::MAX_TIMEOUT_SECS {
                    return Err(AppError::config(format!(
                        "SPEEDTEST_TIMEOUT must be between 1 and {}, got: {}",
                        crate::defaults::MAX_TIMEOUT_SECS,
                        timeout
                    )));
                }
            }
            "SPEEDTEST_BIN" => {
                if !Path::new(value).is_file() {
                    return Err(AppError::config(format!("SPEEDTEST_BIN does not point to a file: {}", value)));
                }
            }
            "SPEEDTEST_SERVERS_URL" => {
                let parsed = url::Url::parse(value)
                    .map_err(|e| AppError::config(format!("Invalid SPEEDTEST_SERVERS_URL '{}': {}", value, e)))?;
                if parsed.scheme() != "http" && parsed.scheme() != "https" {
                    return Err(AppError::config(format!("SPEEDTEST_SERVERS_URL must use http or https: {}", value)));
                }
            }
            _ => {
                // SPEEDTEST_OUTFILE and unknown variables are not checked here
            }
        }

        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("SPEEDTEST_SERVER", "Server id to measure against", "4711"),
            ("SPEEDTEST_RUNS", "Number of measurement runs (1-100)", "5"),
            ("SPEEDTEST_DROP_OUTLIERS", "Drop highest and lowest value", "true"),
            ("SPEEDTEST_OUTFILE", "Append CSV rows to this file", "speed.csv"),
            ("SPEEDTEST_BIN", "Path to the speedtest-cli executable", "/usr/local/bin/speedtest-cli"),
            ("SPEEDTEST_TIMEOUT", "Per-run timeout in seconds (1-3600)", "180"),
            ("SPEEDTEST_SERVERS_URL", "Server list endpoint for auto-selection", crate::defaults::DEFAULT_SERVERS_URL),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<24} {}\n", var, description));
            help.push_str(&format!("  {:<24} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Validate all currently set environment variables
    pub fn validate_current_env() -> Vec<String> {
        let mut warnings = Vec::new();

        for (var_name, _, _) in Self::get_supported_env_vars() {
            if let Ok(value) = std::env::var(var_name) {
                if let Err(e) = Self::validate_env_var(var_name, &value) {
                    warnings.push(format!("Warning: {}", e));
                }
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_validate_env_var() {
        let tool = NamedTempFile::new().unwrap();
        let tool_path = tool.path().to_string_lossy().to_string();

        assert!(EnvManager::validate_env_var("SPEEDTEST_SERVER", "4711").is_ok());
        assert!(EnvManager::validate_env_var("SPEEDTEST_RUNS", "5").is_ok());
        assert!(EnvManager::validate_env_var("SPEEDTEST_RUNS", " 7 ").is_ok());
        assert!(EnvManager::validate_env_var("SPEEDTEST_DROP_OUTLIERS", "false").is_ok());
        assert!(EnvManager::validate_env_var("SPEEDTEST_TIMEOUT", "3600").is_ok());
        assert!(EnvManager::validate_env_var("SPEEDTEST_BIN", &tool_path).is_ok());
        assert!(EnvManager::validate_env_var("SPEEDTEST_SERVERS_URL", "http://127.0.0.1:8080/servers").is_ok());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "true").is_ok());
        assert!(EnvManager::validate_env_var("SPEEDTEST_OUTFILE", "anything.csv").is_ok());

        assert!(EnvManager::validate_env_var("SPEEDTEST_SERVER", "  ").is_err());
        assert!(EnvManager::validate_env_var("SPEEDTEST_RUNS", "0").is_err());
        assert!(EnvManager::validate_env_var("SPEEDTEST_RUNS", "101").is_err());
        assert!(EnvManager::validate_env_var("SPEEDTEST_DROP_OUTLIERS", "yes").is_err());
        assert!(EnvManager::validate_env_var("SPEEDTEST_TIMEOUT", "0").is_err());
        assert!(EnvManager::validate_env_var("SPEEDTEST_TIMEOUT", "3601").is_err());
        assert!(EnvManager::validate_env_var("SPEEDTEST_BIN", "/nonexistent/speedtest-cli").is_err());
        assert!(EnvManager::validate_env_var("SPEEDTEST_SERVERS_URL", "ftp://example.com/list").is_err());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "maybe").is_err());
    }

    #[test]
    fn test_get_supported_env_vars() {
        let vars = EnvManager::get_supported_env_vars();

        assert_eq!(vars.len(), 8);
        for name in ["SPEEDTEST_SERVER", "SPEEDTEST_RUNS", "SPEEDTEST_OUTFILE", "SPEEDTEST_BIN", "ENABLE_COLOR"] {
            assert!(vars.iter().any(|(var, _, _)| *var == name), "missing {}", name);
        }
    }

    #[test]
    fn test_display_env_help() {
        let help = EnvManager::display_env_help();

        assert!(help.contains("Supported Environment Variables:"));
        assert!(help.contains("SPEEDTEST_RUNS"));
        assert!(help.contains("Configuration Priority"));
        assert!(help.contains("Command-line arguments"));
    }

    #[test]
    fn test_load_env_file_from_missing_path() {
        assert!(EnvManager::load_env_file_from(Path::new("/nonexistent/.env"), false).is_ok());
    }

    #[test]
    fn test_load_env_file_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "SPEEDTEST_ENV_FILE_MARKER=loaded").unwrap();

        EnvManager::load_env_file_from(file.path(), false).unwrap();
        assert_eq!(std::env::var("SPEEDTEST_ENV_FILE_MARKER").unwrap(), "loaded");
        std::env::remove_var("SPEEDTEST_ENV_FILE_MARKER");
    }
}
