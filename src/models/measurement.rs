//! Per-run results and the measurement set built from them

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transfer direction reported by the speedtest tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Download,
    Upload,
}

impl Direction {
    /// Both directions in report order
    pub const ALL: [Direction; 2] = [Direction::Download, Direction::Upload];

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Direction::Download => "Download",
            Direction::Upload => "Upload",
        }
    }

    /// Label token that starts the matching line of tool output
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Download => "Download:",
            Direction::Upload => "Upload:",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Download/upload pair from a single tool invocation, in Mbit/s
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub download: f64,
    pub upload: f64,
}

impl RunResult {
    pub fn new(download: f64, upload: f64) -> Self {
        Self { download, upload }
    }

    /// Value for one direction
    pub fn get(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Download => self.download,
            Direction::Upload => self.upload,
        }
    }
}

/// Values collected per direction, one entry per completed run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSet {
    download: Vec<f64>,
    upload: Vec<f64>,
}

impl MeasurementSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preallocate for the expected number of runs
    pub fn with_capacity(runs: usize) -> Self {
        Self {
            download: Vec::with_capacity(runs),
            upload: Vec::with_capacity(runs),
        }
    }

    /// Record one completed run
    pub fn push(&mut self, result: RunResult) {
        self.download.push(result.download);
        self.upload.push(result.upload);
    }

    /// Values for one direction, in run order
    pub fn values(&self, direction: Direction) -> &[f64] {
        match direction {
            Direction::Download => &self.download,
            Direction::Upload => &self.upload,
        }
    }

    /// Number of completed runs
    pub fn len(&self) -> usize {
        self.download.len()
    }

    pub fn is_empty(&self) -> bool {
        self.download.is_empty()
    }
}

impl FromIterator<RunResult> for MeasurementSet {
    fn from_iter<I: IntoIterator<Item = RunResult>>(iter: I) -> Self {
        let mut set = MeasurementSet::new();
        for result in iter {
            set.push(result);
        }
        set
    }
}
