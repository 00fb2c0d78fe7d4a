//! Convergence thresholds.
//!
//! A threshold is a divergence tolerance: below it, a neighborhood is
//! considered statistically close to the reference composition. Sets are
//! kept sorted ascending, so focal distances over a set are non-increasing.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// `count` values evenly spaced over `[min, max]`, endpoints included.
pub fn linspace(min: f64, max: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![min],
        _ => {
            let step = (max - min) / (count - 1) as f64;
            (0..count).map(|i| min + step * i as f64).collect()
        }
    }
}

/// `count` values evenly spaced in log10 over `[min, max]`, endpoints included.
///
/// Both bounds must be positive for the result to be finite.
pub fn logspace(min: f64, max: f64, count: usize) -> Vec<f64> {
    let mut values: Vec<f64> = linspace(min.log10(), max.log10(), count)
        .into_iter()
        .map(|e| 10f64.powf(e))
        .collect();
    // Pin the endpoints against powf rounding.
    if let Some(first) = values.first_mut() {
        *first = min;
    }
    if count > 1 {
        if let Some(last) = values.last_mut() {
            *last = max;
        }
    }
    values
}

/// How a threshold set is generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ThresholdSpec {
    /// Log-spaced between `min` and `max`
    Log { min: f64, max: f64, count: usize },
    /// Linearly spaced between `min` and `max`
    Linear { min: f64, max: f64, count: usize },
    /// Caller-supplied values
    Explicit { values: Vec<f64> },
}

impl Default for ThresholdSpec {
    fn default() -> Self {
        Self::Log {
            min: 1e-7,
            max: 9.0,
            count: 200,
        }
    }
}

impl ThresholdSpec {
    /// Generate and validate the set.
    pub fn build(&self) -> Result<ThresholdSet> {
        match self {
            Self::Log { min, max, count } => ThresholdSet::new(logspace(*min, *max, *count)),
            Self::Linear { min, max, count } => ThresholdSet::new(linspace(*min, *max, *count)),
            Self::Explicit { values } => ThresholdSet::new(values.clone()),
        }
    }
}

/// Sorted, de-duplicated, strictly positive thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdSet {
    values: Vec<f64>,
}

impl ThresholdSet {
    /// Validate, sort ascending and drop duplicates.
    pub fn new(mut values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::EmptyThresholds);
        }
        if let Some(&bad) = values.iter().find(|t| !t.is_finite() || **t <= 0.0) {
            return Err(Error::InvalidThreshold(bad));
        }
        values.sort_by(f64::total_cmp);
        values.dedup();
        Ok(Self { values })
    }

    /// Thresholds in ascending order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of thresholds.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false: construction rejects empty sets.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Smallest threshold.
    pub fn min(&self) -> f64 {
        self.values[0]
    }

    /// Largest threshold.
    pub fn max(&self) -> f64 {
        self.values[self.values.len() - 1]
    }
}
