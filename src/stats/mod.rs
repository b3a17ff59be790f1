//! Averaging and outlier trimming over a measurement set

use crate::{
    error::{AppError, Result},
    models::measurement::{Direction, MeasurementSet},
};
use serde::{Deserialize, Serialize};

/// Trimming is only applied to the text report above this many values
pub const TRIM_THRESHOLD: usize = 4;

/// Annotation appended to a trimmed average in the text report
pub const TRIM_ANNOTATION: &str = " (dropping highest and lowest)";

/// Arithmetic mean of `values`
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(AppError::statistics("Cannot average an empty measurement set"));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sorted copy of `values` without its first and last element
///
/// Exactly one minimum and one maximum are dropped by sorted position, even
/// when several values share the extreme.
pub fn drop_extremes(values: &[f64]) -> Vec<f64> {
    if values.len() < 2 {
        return Vec::new();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted[1..sorted.len() - 1].to_vec()
}

/// Mean after dropping the single lowest and single highest value
pub fn trimmed_mean(values: &[f64]) -> Result<f64> {
    if values.len() < 3 {
        return Err(AppError::statistics(format!(
            "Trimmed mean needs at least 3 values, got {}",
            values.len()
        )));
    }
    mean(&drop_extremes(values))
}

/// Averages for one direction of a measurement set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub direction: Direction,
    /// Number of values summarised
    pub count: usize,
    /// Mean of all values
    pub mean: f64,
    /// Mean without the lowest and highest value, present only when trimming
    /// was requested and more than `TRIM_THRESHOLD` values exist
    pub trimmed_mean: Option<f64>,
}

impl Summary {
    /// Summarise `values`, trimming when requested and enough values exist
    pub fn new(direction: Direction, values: &[f64], drop_outliers: bool) -> Result<Self> {
        let mean = mean(values)?;
        let trimmed_mean = if drop_outliers && values.len() > TRIM_THRESHOLD {
            Some(trimmed_mean(values)?)
        } else {
            None
        };

        Ok(Self {
            direction,
            count: values.len(),
            mean,
            trimmed_mean,
        })
    }

    /// Average shown in the text report
    pub fn average(&self) -> f64 {
        self.trimmed_mean.unwrap_or(self.mean)
    }

    /// Whether the reported average had its extremes dropped
    pub fn is_trimmed(&self) -> bool {
        self.trimmed_mean.is_some()
    }

    /// Annotation for the text report, empty when untrimmed
    pub fn annotation(&self) -> &'static str {
        if self.is_trimmed() {
            TRIM_ANNOTATION
        } else {
            ""
        }
    }
}

/// Builds per-direction summaries from a finished measurement set
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    drop_outliers: bool,
}

impl Aggregator {
    pub fn new(drop_outliers: bool) -> Self {
        Self { drop_outliers }
    }

    /// Summaries for every direction, in report order
    pub fn summarize(&self, set: &MeasurementSet) -> Result<Vec<Summary>> {
        Direction::ALL
            .iter()
            .map(|&direction| Summary::new(direction, set.values(direction), self.drop_outliers))
            .collect()
    }

    /// (untrimmed, trimmed) means for the CSV row, regardless of threshold
    pub fn file_columns(&self, set: &MeasurementSet, direction: Direction) -> Result<(f64, f64)> {
        let values = set.values(direction);
        Ok((mean(values)?, trimmed_mean(values)?))
    }
}
