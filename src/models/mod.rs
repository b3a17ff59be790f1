//! Data models for the speedtest averager

pub mod config;
pub mod measurement;
pub mod report;

// Re-export main model types
pub use config::Config;
pub use measurement::{Direction, MeasurementSet, RunResult};
pub use report::Report;
pub use crate::stats::Summary;
