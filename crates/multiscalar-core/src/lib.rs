//! Multiscalar Segregation Index
//!
//! Segregation is not a single number at a single scale. Around every point
//! a neighborhood grows outward, one nearest neighbor at a time, and its
//! composition drifts toward the composition of the whole population. How
//! long that drift takes is the point's **distortion coefficient**.
//!
//! # Pipeline
//!
//! 1. Rank every point by distance from the origin
//! 2. Accumulate category magnitudes along that order (the trajectory)
//! 3. Measure each step's divergence from the reference distribution
//! 4. For each threshold, find the focal distance past which divergence
//!    stays below it
//! 5. Integrate focal distance over all thresholds
//! 6. Divide by the same integral for the most segregated arrangement the
//!    population admits
//!
//! Steps 4 and 5 collapse into one inward scan of the trajectory (the
//! envelope path), which is what [`Analyzer::distortion_coefficients`] runs.
//! The explicit threshold path is kept for diagnostics.
//!
//! # Divergence
//!
//! Kullback-Leibler divergence in bits, with reference shares floored at
//! [`divergence::SHARE_FLOOR`]:
//!
//! ```text
//! D(p‖q) = Σ pₖ · log₂(pₖ / max(ε, qₖ))
//! ```

pub mod analysis;
pub mod composition;
pub mod config;
pub mod distortion;
pub mod divergence;
mod error;
pub mod focal;
pub mod normalization;
pub mod ragged;
pub mod threshold;
pub mod trajectory;
pub mod xvalues;

pub use analysis::{Analyzer, DistortionReport, OriginAnalysis, PartialAnalysis};
pub use composition::CategoryMatrix;
pub use config::{AnalysisConfig, ReferenceMode};
pub use error::{Error, Result};
pub use ragged::Ragged;
pub use threshold::{ThresholdSet, ThresholdSpec};
pub use trajectory::{DegeneratePolicy, Trajectory};
pub use xvalues::{XAxis, XValues};

pub use multiscalar_geometry::{DistanceMetric, GeoPoint};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_mixture_has_no_distortion() {
        // Every point holds both categories in equal measure.
        let points: Vec<GeoPoint> = (0..5).map(|i| GeoPoint::new(i as f64, 0.0)).collect();
        let matrix = CategoryMatrix::new(vec![vec![1.0; 5], vec![1.0; 5]]).unwrap();
        let analyzer = Analyzer::new(&points, &matrix, AnalysisConfig::default()).unwrap();

        let report = analyzer.distortion_coefficients().unwrap();
        assert!(report.raw.iter().all(|&r| r.abs() < 1e-12));
        assert!(report.normalized.iter().all(|&r| r.abs() < 1e-12));
    }

    #[test]
    fn single_category_cannot_be_normalized() {
        let points: Vec<GeoPoint> = (0..4).map(|i| GeoPoint::new(0.0, i as f64)).collect();
        let matrix = CategoryMatrix::new(vec![vec![3.0; 4]]).unwrap();
        let analyzer = Analyzer::new(&points, &matrix, AnalysisConfig::default()).unwrap();

        assert_eq!(
            analyzer.distortion_coefficients().unwrap_err(),
            Error::ZeroNormalization
        );
    }
}
