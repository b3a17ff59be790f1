//! Speedtest Averager
//!
//! Runs `speedtest-cli` several times against a single server, parses the
//! Download/Upload figures from each run and reports the averaged result,
//! either as a short text summary or as a CSV row appended to a file.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod parser;
pub mod runner;
pub mod server;
pub mod stats;

// Re-export commonly used types
pub use app::App;
pub use error::{AppError, Result};
pub use models::{Config, Direction, MeasurementSet, Report, RunResult, Summary};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// Version line with the build metadata recorded by build.rs
pub fn build_info() -> String {
    format!(
        "{} v{} ({}, built {} for {})",
        PKG_NAME,
        VERSION,
        option_env!("GIT_COMMIT").unwrap_or("unknown commit"),
        option_env!("BUILD_TIME").unwrap_or("unknown time"),
        option_env!("TARGET_TRIPLE").unwrap_or("unknown target"),
    )
}

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_RUNS: u32 = 3;
    pub const MAX_RUNS: u32 = 100;
    pub const MAX_TIMEOUT_SECS: u64 = 3600;
    pub const DEFAULT_DROP_OUTLIERS: bool = false;
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    /// Name of the measurement executable
    pub const TOOL_NAME: &str = "speedtest-cli";

    /// Server list endpoint, closest servers first
    pub const DEFAULT_SERVERS_URL: &str = "https://www.speedtest.net/api/js/servers?engine=js&limit=10";
    /// How many of the closest servers get a latency probe
    pub const DEFAULT_CANDIDATE_LIMIT: usize = 5;
    /// Timeout for server list and latency probe requests
    pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);
}
