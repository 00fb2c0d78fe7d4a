//! Analysis configuration.

use multiscalar_geometry::DistanceMetric;
use serde::{Deserialize, Serialize};

use crate::{DegeneratePolicy, Error, Result, ThresholdSpec, XAxis};

/// Tolerance on the sum of a fixed reference distribution.
pub const REFERENCE_SUM_TOLERANCE: f64 = 1e-9;

/// What local compositions are compared against.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReferenceMode {
    /// Each origin's own full-neighborhood composition (farthest rank).
    #[default]
    TrajectoryEnd,
    /// One externally supplied distribution for every origin.
    Fixed { distribution: Vec<f64> },
}

impl ReferenceMode {
    /// Validate against `num_categories`; `None` means per-origin.
    pub fn resolve(&self, num_categories: usize) -> Result<Option<Vec<f64>>> {
        let distribution = match self {
            Self::TrajectoryEnd => return Ok(None),
            Self::Fixed { distribution } => distribution,
        };

        if distribution.len() != num_categories {
            return Err(Error::LengthMismatch {
                what: "reference distribution",
                expected: num_categories,
                found: distribution.len(),
            });
        }
        if distribution.iter().any(|q| !q.is_finite() || *q < 0.0) {
            return Err(Error::InvalidReference(
                "shares must be finite and non-negative".into(),
            ));
        }
        let sum: f64 = distribution.iter().sum();
        if (sum - 1.0).abs() > REFERENCE_SUM_TOLERANCE {
            return Err(Error::InvalidReference(format!("shares sum to {}", sum)));
        }

        Ok(Some(distribution.iter().map(|q| q / sum).collect()))
    }
}

/// Configuration for one analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// How distances between points are measured
    pub metric: DistanceMetric,
    /// X axis for focal distances and integrals
    pub x_axis: XAxis,
    /// Reference distribution for divergences
    pub reference: ReferenceMode,
    /// Handling of zero-total ranks
    pub degenerate: DegeneratePolicy,
    /// Convergence thresholds for the threshold path and diagnostics
    pub thresholds: ThresholdSpec,
    /// Worker threads; `None` uses the global rayon pool
    pub threads: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            metric: DistanceMetric::Haversine,
            x_axis: XAxis::Rank,
            reference: ReferenceMode::TrajectoryEnd,
            degenerate: DegeneratePolicy::Fail,
            thresholds: ThresholdSpec::default(),
            threads: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.metric, DistanceMetric::Haversine);
        assert_eq!(config.x_axis, XAxis::Rank);
        assert_eq!(config.reference, ReferenceMode::TrajectoryEnd);
        assert_eq!(config.degenerate, DegeneratePolicy::Fail);
        assert!(config.threads.is_none());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: AnalysisConfig = serde_json::from_str(
            r#"{"metric": "squared_planar", "x_axis": "population", "threads": 2}"#,
        )
        .unwrap();
        assert_eq!(config.metric, DistanceMetric::SquaredPlanar);
        assert_eq!(config.x_axis, XAxis::Population);
        assert_eq!(config.threads, Some(2));
        assert_eq!(config.thresholds, ThresholdSpec::default());
    }

    #[test]
    fn fixed_reference_validated() {
        let mode = ReferenceMode::Fixed {
            distribution: vec![0.25, 0.75],
        };
        assert_eq!(mode.resolve(2).unwrap(), Some(vec![0.25, 0.75]));
        assert!(matches!(mode.resolve(3), Err(Error::LengthMismatch { .. })));

        let bad_sum = ReferenceMode::Fixed {
            distribution: vec![0.5, 0.6],
        };
        assert!(matches!(bad_sum.resolve(2), Err(Error::InvalidReference(_))));

        let negative = ReferenceMode::Fixed {
            distribution: vec![1.5, -0.5],
        };
        assert!(matches!(negative.resolve(2), Err(Error::InvalidReference(_))));
    }

    #[test]
    fn trajectory_end_resolves_per_origin() {
        assert_eq!(ReferenceMode::TrajectoryEnd.resolve(4).unwrap(), None);
    }
}
