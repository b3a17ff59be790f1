//! Configuration data model and validation

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
///
/// Every default the pipeline relies on lives here; nothing is read from
/// process-wide state once the configuration has been built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Explicit server identifier; `None` means auto-select
    #[serde(default)]
    pub server: Option<String>,

    /// Number of measurement runs
    #[serde(default = "default_runs")]
    pub runs: u32,

    /// Report trimmed means when more than four runs are available
    #[serde(default = "default_drop_outliers")]
    pub drop_outliers: bool,

    /// Append a CSV row here instead of printing the text report
    #[serde(default)]
    pub outfile: Option<PathBuf>,

    /// Explicit path to the speedtest executable
    #[serde(default)]
    pub tool_path: Option<PathBuf>,

    /// Per-run timeout for the external tool, in seconds
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// Server list endpoint used by the best-server lookup
    #[serde(default = "default_servers_url")]
    pub servers_url: String,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: None,
            runs: default_runs(),
            drop_outliers: default_drop_outliers(),
            outfile: None,
            tool_path: None,
            timeout_seconds: None,
            servers_url: default_servers_url(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Per-run timeout as Duration, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    /// Whether the result goes to a file rather than stdout
    pub fn is_file_mode(&self) -> bool {
        self.outfile.is_some()
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if let Some(server) = &self.server {
            if server.trim().is_empty() {
                return Err(AppError::config("Server identifier cannot be empty"));
            }
        }

        if self.runs == 0 {
            return Err(AppError::validation("Run count must be greater than 0"));
        }

        if self.runs > crate::defaults::MAX_RUNS {
            return Err(AppError::validation(format!(
                "Run count cannot exceed {}",
                crate::defaults::MAX_RUNS
            )));
        }

        // The CSV row always carries trimmed means, which need something
        // left after dropping the lowest and highest value.
        if self.is_file_mode() && self.runs < 3 {
            return Err(AppError::validation(format!(
                "--outfile needs at least 3 runs for the trimmed columns, got {}",
                self.runs
            )));
        }

        if let Some(timeout) = self.timeout_seconds {
            if timeout == 0 {
                return Err(AppError::validation("Timeout must be greater than 0"));
            }
            if timeout > crate::defaults::MAX_TIMEOUT_SECS {
                return Err(AppError::validation(format!(
                    "Timeout cannot exceed {} seconds",
                    crate::defaults::MAX_TIMEOUT_SECS
                )));
            }
        }

        if let Some(outfile) = &self.outfile {
            if outfile.as_os_str().is_empty() {
                return Err(AppError::config("Output file path cannot be empty"));
            }
        }

        match url::Url::parse(&self.servers_url) {
            Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
            Ok(_) => {
                return Err(AppError::config(format!(
                    "Server list URL must use http or https: {}",
                    self.servers_url
                )))
            }
            Err(e) => {
                return Err(AppError::config(format!(
                    "Invalid server list URL '{}': {}",
                    self.servers_url, e
                )))
            }
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(server) = std::env::var("SPEEDTEST_SERVER") {
            let server = server.trim();
            if !server.is_empty() {
                self.server = Some(server.to_string());
            }
        }

        if let Ok(runs) = std::env::var("SPEEDTEST_RUNS") {
            self.runs = runs.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid SPEEDTEST_RUNS value '{}': {}", runs, e)))?;
        }

        if let Ok(drop) = std::env::var("SPEEDTEST_DROP_OUTLIERS") {
            self.drop_outliers = drop.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid SPEEDTEST_DROP_OUTLIERS value '{}': {}", drop, e)))?;
        }

        if let Ok(outfile) = std::env::var("SPEEDTEST_OUTFILE") {
            if !outfile.trim().is_empty() {
                self.outfile = Some(PathBuf::from(outfile.trim()));
            }
        }

        if let Ok(tool) = std::env::var("SPEEDTEST_BIN") {
            if !tool.trim().is_empty() {
                self.tool_path = Some(PathBuf::from(tool.trim()));
            }
        }

        if let Ok(timeout) = std::env::var("SPEEDTEST_TIMEOUT") {
            let secs: u64 = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid SPEEDTEST_TIMEOUT value '{}': {}", timeout, e)))?;
            self.timeout_seconds = Some(secs);
        }

        if let Ok(url) = std::env::var("SPEEDTEST_SERVERS_URL") {
            if !url.trim().is_empty() {
                self.servers_url = url.trim().to_string();
            }
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_runs() -> u32 {
    crate::defaults::DEFAULT_RUNS
}

fn default_drop_outliers() -> bool {
    crate::defaults::DEFAULT_DROP_OUTLIERS
}

fn default_servers_url() -> String {
    crate::defaults::DEFAULT_SERVERS_URL.to_string()
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
