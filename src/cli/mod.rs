//! Command-line interface

use crate::config::EnvManager;
use clap::Parser;
use std::path::PathBuf;

/// Speedtest Averager - run speedtest-cli several times and average the results
#[derive(Parser, Debug, Clone)]
#[command(name = "speedtest-avg")]
#[command(version, about, long_about = None)]
#[command(after_help = EnvManager::display_env_help())]
pub struct Cli {
    /// Speedtest server id; the closest low-latency server is picked when omitted
    #[arg(short, long, value_name = "ID")]
    pub server: Option<String>,

    /// Number of measurement runs
    #[arg(short, long, value_parser = parse_runs)]
    pub runs: Option<u32>,

    /// Drop the highest and lowest value before averaging (needs more than 4 runs)
    #[arg(long, overrides_with = "no_drop_outliers")]
    pub drop_outliers: bool,

    /// Average every value, even when SPEEDTEST_DROP_OUTLIERS is set
    #[arg(long, overrides_with = "drop_outliers")]
    pub no_drop_outliers: bool,

    /// Append a CSV row to this file instead of printing a summary
    #[arg(short, long, value_name = "FILE")]
    pub outfile: Option<PathBuf>,

    /// Path to the speedtest-cli executable
    #[arg(long, value_name = "PATH")]
    pub tool: Option<PathBuf>,

    /// Per-run timeout in seconds
    #[arg(short, long, value_parser = parse_duration)]
    pub timeout: Option<u64>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        !self.no_color && supports_color()
    }

    /// Get configuration summary for display
    pub fn get_config_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("Command Line:\n");
        summary.push_str(&format!(
            "  Server: {}\n",
            self.server.as_deref().unwrap_or("auto")
        ));
        if let Some(runs) = self.runs {
            summary.push_str(&format!("  Runs: {}\n", runs));
        }
        if self.drop_outliers || self.no_drop_outliers {
            summary.push_str(&format!("  Drop outliers: {}\n", self.drop_outliers));
        }
        if let Some(ref outfile) = self.outfile {
            summary.push_str(&format!("  Output file: {}\n", outfile.display()));
        }
        if let Some(ref tool) = self.tool {
            summary.push_str(&format!("  Tool: {}\n", tool.display()));
        }
        if let Some(timeout) = self.timeout {
            summary.push_str(&format!("  Timeout: {}s\n", timeout));
        }
        summary.push_str(&format!("  Verbose mode: {}\n", self.verbose));
        summary.push_str(&format!("  Debug mode: {}\n", self.debug));

        summary
    }
}

/// Parse run count, 1..=MAX_RUNS
fn parse_runs(s: &str) -> Result<u32, String> {
    if s.starts_with('+') {
        return Err(format!("Invalid run count: {}", s));
    }

    s.parse::<u32>()
        .map_err(|_| format!("Invalid run count: {}", s))
        .and_then(|runs| {
            if runs == 0 {
                Err("Run count must be greater than 0".to_string())
            } else if runs > crate::defaults::MAX_RUNS {
                Err(format!("Run count cannot exceed {}", crate::defaults::MAX_RUNS))
            } else {
                Ok(runs)
            }
        })
}

/// Parse duration from seconds string
fn parse_duration(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Duration must be greater than 0".to_string())
            } else if secs > crate::defaults::MAX_TIMEOUT_SECS {
                Err(format!(
                    "Duration cannot exceed {} seconds",
                    crate::defaults::MAX_TIMEOUT_SECS
                ))
            } else {
                Ok(secs)
            }
        })
}

/// Check if the terminal supports color output
pub fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}
