//! Whole-dataset analysis.
//!
//! [`Analyzer`] ties the pipeline together for every origin:
//!
//! ```text
//! points ──rank──► neighbor order ──accumulate──► trajectory
//!                                                    │
//!           coefficient ◄──integrate── divergence ◄──┘
//! ```
//!
//! Origins are independent, so the sweep runs data-parallel on rayon. Each
//! worker reuses one [`Worker`] scratch set (ranking, trajectory, divergence)
//! across the origins it visits; only the coefficient and the worst X curve
//! leave the worker.

use multiscalar_geometry::{GeoPoint, NeighborRanker, Ranking};
use rand::Rng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::distortion::{envelope_distortion, threshold_distortion};
use crate::divergence::{divergence_trajectory, divergence_trajectory_into};
use crate::focal::{focal_indexes, interpolated_focal_distances_into, upper_envelope};
use crate::normalization::{normalization_factor, worst_case_divergence};
use crate::xvalues::merge_worst;
use crate::{
    AnalysisConfig, CategoryMatrix, Error, Ragged, Result, ThresholdSet, Trajectory, XAxis,
    XValues,
};

/// Every intermediate artifact for one origin.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginAnalysis {
    pub origin: usize,
    pub ranking: Ranking,
    pub trajectory: Trajectory,
    /// Divergence from the reference at each rank
    pub divergence: Vec<f64>,
    /// X value at each rank
    pub x_values: Vec<f64>,
    /// Discrete focal rank per threshold
    pub focal_indexes: Vec<usize>,
    /// X value at each discrete focal rank
    pub focal_distances: Vec<f64>,
    /// Focal distance along the interpolated upper envelope, per threshold
    pub interpolated_focal_distances: Vec<f64>,
    /// Threshold-path coefficient over the configured thresholds
    pub threshold_distortion: f64,
    /// Envelope-path coefficient
    pub envelope_distortion: f64,
}

/// Coefficients for a set of origins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistortionReport {
    /// Analysed origins, ascending
    pub origins: Vec<usize>,
    /// Envelope-path coefficient per origin
    pub raw: Vec<f64>,
    /// Worst-case coefficient every raw value is divided by
    pub normalization_factor: f64,
    /// `raw / normalization_factor`
    pub normalized: Vec<f64>,
}

/// Full diagnostics for a sample of origins.
///
/// Rows follow `origins`. Trajectories are kept one ragged array per
/// category, as they are persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartialAnalysis {
    pub origins: Vec<usize>,
    pub thresholds: Vec<f64>,
    /// Distance from the origin to every point, by point index
    pub distances: Ragged<f64>,
    /// Points in rank order
    pub neighbors: Ragged<usize>,
    /// Share of each category along each origin's trajectory
    pub trajectories: Vec<Ragged<f64>>,
    pub divergences: Ragged<f64>,
    pub focal_indexes: Ragged<usize>,
    /// Envelope-path coefficient per origin, as in the full pass
    pub distortion: Vec<f64>,
    /// Threshold-path coefficient per origin over `thresholds`
    pub threshold_distortion: Vec<f64>,
    pub normalization_factor: f64,
    /// `distortion / normalization_factor`
    pub normalized: Vec<f64>,
}

/// Per-worker scratch and partial results.
struct Worker {
    ranking: Ranking,
    trajectory: Trajectory,
    divergence: Vec<f64>,
    sweep: Sweep,
}

/// What one worker hands back: `(slot, coefficient)` pairs and the worst X
/// curve over the origins it visited.
#[derive(Default)]
struct Sweep {
    raw: Vec<(usize, f64)>,
    worst_x: Vec<f64>,
}

impl Sweep {
    fn merge(mut self, other: Sweep) -> Sweep {
        self.raw.extend(other.raw);
        merge_worst(&mut self.worst_x, &other.worst_x);
        self
    }
}

impl Worker {
    fn new(num_categories: usize, num_points: usize) -> Self {
        Self {
            ranking: Ranking::with_capacity(num_points),
            trajectory: Trajectory::with_capacity(num_categories, num_points),
            divergence: Vec::with_capacity(num_points),
            sweep: Sweep::default(),
        }
    }

    fn visit(&mut self, analyzer: &Analyzer<'_>, slot: usize, origin: usize) -> Result<()> {
        analyzer.ranker.rank_into(origin, &mut self.ranking)?;
        self.trajectory
            .rebuild(analyzer.matrix, self.ranking.order(), analyzer.config.degenerate)?;

        let reference = match &analyzer.reference {
            Some(fixed) => fixed.as_slice(),
            None => self.trajectory.last(),
        };
        divergence_trajectory_into(&self.trajectory, reference, &mut self.divergence);

        let x = axis_values(analyzer.config.x_axis, &self.ranking, &self.trajectory);
        let raw = envelope_distortion(&self.divergence, x);
        if let XValues::Explicit(row) = x {
            merge_worst(&mut self.sweep.worst_x, row);
        }

        trace!(origin, raw, "origin distortion");
        self.sweep.raw.push((slot, raw));
        Ok(())
    }

    /// Fold only `origin`'s X sequence into the worst curve.
    fn track_x(&mut self, analyzer: &Analyzer<'_>, origin: usize) -> Result<()> {
        let row = match analyzer.config.x_axis {
            XAxis::Rank => return Ok(()),
            XAxis::Distance => {
                analyzer.ranker.rank_into(origin, &mut self.ranking)?;
                self.ranking.distances()
            }
            XAxis::Population => {
                analyzer.ranker.rank_into(origin, &mut self.ranking)?;
                self.trajectory.rebuild(
                    analyzer.matrix,
                    self.ranking.order(),
                    analyzer.config.degenerate,
                )?;
                self.trajectory.accumulated_totals()
            }
        };
        merge_worst(&mut self.sweep.worst_x, row);
        Ok(())
    }
}

/// X values of one origin under `axis`.
fn axis_values<'s>(axis: XAxis, ranking: &'s Ranking, trajectory: &'s Trajectory) -> XValues<'s> {
    match axis {
        XAxis::Rank => XValues::Rank,
        XAxis::Distance => XValues::Explicit(ranking.distances()),
        XAxis::Population => XValues::Explicit(trajectory.accumulated_totals()),
    }
}

/// Runs distortion analyses over one dataset.
pub struct Analyzer<'a> {
    ranker: NeighborRanker<'a>,
    matrix: &'a CategoryMatrix,
    config: AnalysisConfig,
    thresholds: ThresholdSet,
    reference: Option<Vec<f64>>,
}

impl<'a> Analyzer<'a> {
    /// Validate inputs and configuration.
    pub fn new(
        points: &'a [GeoPoint],
        matrix: &'a CategoryMatrix,
        config: AnalysisConfig,
    ) -> Result<Self> {
        if points.len() != matrix.num_points() {
            return Err(Error::LengthMismatch {
                what: "coordinates",
                expected: matrix.num_points(),
                found: points.len(),
            });
        }
        let ranker = NeighborRanker::new(points, config.metric)?;
        let thresholds = config.thresholds.build()?;
        let reference = config.reference.resolve(matrix.num_categories())?;

        debug!(
            points = points.len(),
            categories = matrix.num_categories(),
            thresholds = thresholds.len(),
            metric = ?config.metric,
            x_axis = ?config.x_axis,
            "analyzer ready"
        );

        Ok(Self {
            ranker,
            matrix,
            config,
            thresholds,
            reference,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn thresholds(&self) -> &ThresholdSet {
        &self.thresholds
    }

    pub fn num_points(&self) -> usize {
        self.matrix.num_points()
    }

    /// Full pipeline for a single origin, every artifact retained.
    pub fn origin(&self, origin: usize) -> Result<OriginAnalysis> {
        let ranking = self.ranker.rank(origin)?;
        let trajectory = Trajectory::build(self.matrix, ranking.order(), self.config.degenerate)?;
        let reference = match &self.reference {
            Some(fixed) => fixed.as_slice(),
            None => trajectory.last(),
        };
        let divergence = divergence_trajectory(&trajectory, reference);

        let x_values: Vec<f64> = match axis_values(self.config.x_axis, &ranking, &trajectory) {
            XValues::Rank => (0..ranking.len()).map(|r| r as f64).collect(),
            XValues::Explicit(values) => values.to_vec(),
        };
        let x = XValues::Explicit(&x_values);

        let focal_indexes = focal_indexes(&divergence, &self.thresholds);
        let focal_distances = focal_indexes.iter().map(|&idx| x.at(idx)).collect();

        let envelope = upper_envelope(&divergence);
        let mut interpolated = Vec::with_capacity(self.thresholds.len());
        interpolated_focal_distances_into(&envelope, &self.thresholds, x, &mut interpolated);

        let threshold_distortion = threshold_distortion(&self.thresholds, &interpolated, x.at(0));
        let envelope_distortion = envelope_distortion(&divergence, x);

        Ok(OriginAnalysis {
            origin,
            ranking,
            trajectory,
            divergence,
            x_values,
            focal_indexes,
            focal_distances,
            interpolated_focal_distances: interpolated,
            threshold_distortion,
            envelope_distortion,
        })
    }

    /// Normalized coefficients for every point.
    pub fn distortion_coefficients(&self) -> Result<DistortionReport> {
        let origins: Vec<usize> = (0..self.num_points()).collect();
        self.distortion_coefficients_for(&origins)
    }

    /// Normalized coefficients for the given origins, in the given order.
    ///
    /// The normalization factor does not depend on `origins`: on a non-rank
    /// axis its worst X curve always spans every point.
    pub fn distortion_coefficients_for(&self, origins: &[usize]) -> Result<DistortionReport> {
        info!(
            origins = origins.len(),
            points = self.num_points(),
            categories = self.matrix.num_categories(),
            "computing distortion coefficients"
        );

        let (k_count, n) = (self.matrix.num_categories(), self.num_points());
        let sweep = self.install(|| {
            origins
                .par_iter()
                .enumerate()
                .try_fold(
                    || Worker::new(k_count, n),
                    |mut worker, (slot, &origin)| -> Result<Worker> {
                        worker.visit(self, slot, origin)?;
                        Ok(worker)
                    },
                )
                .map(|worker| worker.map(|w| w.sweep))
                .try_reduce(Sweep::default, |a, b| Ok(a.merge(b)))
        })??;

        let mut raw = vec![0.0; origins.len()];
        for (slot, value) in sweep.raw {
            raw[slot] = value;
        }

        let swept_all = self.covers_every_point(origins);
        let factor = self.normalization(swept_all.then_some(sweep.worst_x.as_slice()))?;
        let normalized = raw.iter().map(|r| r / factor).collect();
        info!(factor, "distortion coefficients ready");

        Ok(DistortionReport {
            origins: origins.to_vec(),
            raw,
            normalization_factor: factor,
            normalized,
        })
    }

    /// Pick `count` distinct origins uniformly at random, ascending.
    pub fn sample_origins<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Result<Vec<usize>> {
        let available = self.num_points();
        if count > available {
            return Err(Error::SampleTooLarge {
                requested: count,
                available,
            });
        }
        let mut origins = rand::seq::index::sample(rng, available, count).into_vec();
        origins.sort_unstable();
        Ok(origins)
    }

    /// Full diagnostics for `origins`.
    ///
    /// Coefficients and normalization match the full pass for the same
    /// origin; the threshold-path value is reported alongside.
    pub fn partial_analysis(&self, origins: &[usize]) -> Result<PartialAnalysis> {
        info!(origins = origins.len(), "partial analysis");

        let analyses: Vec<OriginAnalysis> = self.install(|| {
            origins
                .par_iter()
                .map(|&origin| self.origin(origin))
                .collect::<Result<Vec<_>>>()
        })??;

        let k_count = self.matrix.num_categories();
        let mut distances = Ragged::new();
        let mut neighbors = Ragged::new();
        let mut trajectories: Vec<Ragged<f64>> = (0..k_count).map(|_| Ragged::new()).collect();
        let mut divergences = Ragged::new();
        let mut focal = Ragged::new();
        let mut distortion = Vec::with_capacity(analyses.len());
        let mut threshold_distortion = Vec::with_capacity(analyses.len());

        for analysis in &analyses {
            distances.push_row(analysis.ranking.distance_row().iter().copied());
            neighbors.push_row(analysis.ranking.order().iter().copied());
            for (k, rows) in trajectories.iter_mut().enumerate() {
                rows.push_row(analysis.trajectory.category_series(k));
            }
            divergences.push_row(analysis.divergence.iter().copied());
            focal.push_row(analysis.focal_indexes.iter().copied());
            distortion.push(analysis.envelope_distortion);
            threshold_distortion.push(analysis.threshold_distortion);
        }

        let factor = self.normalization(None)?;
        let normalized = distortion.iter().map(|d| d / factor).collect();

        Ok(PartialAnalysis {
            origins: origins.to_vec(),
            thresholds: self.thresholds.values().to_vec(),
            distances,
            neighbors,
            trajectories,
            divergences,
            focal_indexes: focal,
            distortion,
            threshold_distortion,
            normalization_factor: factor,
            normalized,
        })
    }

    /// Elementwise maximum of every point's X sequence.
    ///
    /// Empty on the rank axis.
    pub fn worst_x_curve(&self) -> Result<Vec<f64>> {
        let (k_count, n) = (self.matrix.num_categories(), self.num_points());
        let sweep = self.install(|| {
            (0..n)
                .into_par_iter()
                .try_fold(
                    || Worker::new(k_count, n),
                    |mut worker, origin| -> Result<Worker> {
                        worker.track_x(self, origin)?;
                        Ok(worker)
                    },
                )
                .map(|worker| worker.map(|w| w.sweep))
                .try_reduce(Sweep::default, |a, b| Ok(a.merge(b)))
        })??;

        debug!(
            x_axis = ?self.config.x_axis,
            extent = sweep.worst_x.last().copied().unwrap_or(0.0),
            "worst x curve"
        );
        Ok(sweep.worst_x)
    }

    /// Worst-case coefficient.
    ///
    /// `swept` is the worst X curve when the caller already holds one over
    /// every point; otherwise it is computed here. Unused on the rank axis.
    fn normalization(&self, swept: Option<&[f64]>) -> Result<f64> {
        let worst = worst_case_divergence(
            &self.matrix.category_totals(),
            &self.matrix.populations(),
            self.config.degenerate,
        )?;
        if self.config.x_axis == XAxis::Rank {
            return normalization_factor(&worst, XValues::Rank);
        }

        let computed;
        let worst_x = match swept {
            Some(curve) => curve,
            None => {
                computed = self.worst_x_curve()?;
                computed.as_slice()
            }
        };
        normalization_factor(&worst, XValues::explicit(worst_x, worst.len())?)
    }

    /// True when `origins` names every point at least once.
    fn covers_every_point(&self, origins: &[usize]) -> bool {
        let mut seen = vec![false; self.num_points()];
        for &origin in origins {
            if let Some(slot) = seen.get_mut(origin) {
                *slot = true;
            }
        }
        seen.into_iter().all(|s| s)
    }

    /// Run `op` on a dedicated pool when `threads` is set.
    fn install<T, F>(&self, op: F) -> Result<T>
    where
        T: Send,
        F: FnOnce() -> T + Send,
    {
        match self.config.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
                Ok(pool.install(op))
            }
            None => Ok(op()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ReferenceMode, ThresholdSpec};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Points on a line; first half all category 0, second half category 1.
    fn split_line(n: usize) -> (Vec<GeoPoint>, CategoryMatrix) {
        let points = (0..n).map(|i| GeoPoint::new(0.0, i as f64 * 0.01)).collect();
        let a = (0..n).map(|i| if i < n / 2 { 1.0 } else { 0.0 }).collect();
        let b = (0..n).map(|i| if i < n / 2 { 0.0 } else { 1.0 }).collect();
        (points, CategoryMatrix::new(vec![a, b]).unwrap())
    }

    #[test]
    fn rejects_mismatched_points() {
        let (points, matrix) = split_line(6);
        let err = Analyzer::new(&points[..5], &matrix, AnalysisConfig::default());
        assert!(matches!(err, Err(Error::LengthMismatch { .. })));
    }

    #[test]
    fn origin_artifacts_are_consistent() {
        let (points, matrix) = split_line(10);
        let analyzer = Analyzer::new(&points, &matrix, AnalysisConfig::default()).unwrap();
        let o = analyzer.origin(0).unwrap();

        assert_eq!(o.ranking.order()[0], 0);
        assert_eq!(o.divergence.len(), 10);
        assert!(o.divergence[9].abs() < 1e-12);
        assert!((o.divergence[0] - 1.0).abs() < 1e-12);
        assert_eq!(o.focal_indexes.len(), analyzer.thresholds().len());
        assert!(o.envelope_distortion > 0.0);
    }

    #[test]
    fn coefficients_cover_every_origin() {
        let (points, matrix) = split_line(12);
        let analyzer = Analyzer::new(&points, &matrix, AnalysisConfig::default()).unwrap();
        let report = analyzer.distortion_coefficients().unwrap();

        assert_eq!(report.raw.len(), 12);
        assert!(report.normalization_factor > 0.0);
        for (slot, &origin) in report.origins.iter().enumerate() {
            let single = analyzer.origin(origin).unwrap();
            assert!((report.raw[slot] - single.envelope_distortion).abs() < 1e-12);
        }
    }

    #[test]
    fn dedicated_pool_matches_global() {
        let (points, matrix) = split_line(16);
        let global = Analyzer::new(&points, &matrix, AnalysisConfig::default())
            .unwrap()
            .distortion_coefficients()
            .unwrap();
        let config = AnalysisConfig {
            threads: Some(2),
            ..AnalysisConfig::default()
        };
        let pooled = Analyzer::new(&points, &matrix, config)
            .unwrap()
            .distortion_coefficients()
            .unwrap();
        assert_eq!(global, pooled);
    }

    #[test]
    fn sampling_is_sorted_and_distinct() {
        let (points, matrix) = split_line(20);
        let analyzer = Analyzer::new(&points, &matrix, AnalysisConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let origins = analyzer.sample_origins(8, &mut rng).unwrap();
        assert_eq!(origins.len(), 8);
        assert!(origins.windows(2).all(|w| w[0] < w[1]));
        assert!(matches!(
            analyzer.sample_origins(21, &mut rng),
            Err(Error::SampleTooLarge { requested: 21, available: 20 })
        ));
    }

    #[test]
    fn partial_rows_follow_origins() {
        let (points, matrix) = split_line(8);
        let config = AnalysisConfig {
            thresholds: ThresholdSpec::Explicit {
                values: vec![0.01, 0.1, 0.5],
            },
            ..AnalysisConfig::default()
        };
        let analyzer = Analyzer::new(&points, &matrix, config).unwrap();
        let partial = analyzer.partial_analysis(&[5, 1]).unwrap();

        assert_eq!(partial.neighbors.len(), 2);
        assert_eq!(partial.neighbors.row(0)[0], 5);
        assert_eq!(partial.neighbors.row(1)[0], 1);
        assert_eq!(partial.distances.row(0)[5], 0.0);
        assert_eq!(partial.trajectories.len(), 2);
        assert_eq!(partial.focal_indexes.row(0).len(), 3);
        assert_eq!(partial.thresholds, vec![0.01, 0.1, 0.5]);
    }

    #[test]
    fn fixed_reference_used_for_every_origin() {
        let (points, matrix) = split_line(6);
        let config = AnalysisConfig {
            reference: ReferenceMode::Fixed {
                distribution: vec![0.5, 0.5],
            },
            ..AnalysisConfig::default()
        };
        let analyzer = Analyzer::new(&points, &matrix, config).unwrap();
        let o = analyzer.origin(0).unwrap();
        // The full neighborhood matches the fixed reference exactly.
        assert!(o.divergence[5].abs() < 1e-12);
        assert!((o.divergence[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn distance_axis_normalizes_with_worst_curve() {
        let (points, matrix) = split_line(10);
        let config = AnalysisConfig {
            metric: multiscalar_geometry::DistanceMetric::SquaredPlanar,
            x_axis: XAxis::Distance,
            ..AnalysisConfig::default()
        };
        let analyzer = Analyzer::new(&points, &matrix, config).unwrap();
        let report = analyzer.distortion_coefficients().unwrap();
        assert!(report.normalization_factor > 0.0);
        assert!(report.normalized.iter().all(|v| v.is_finite() && *v >= 0.0));
    }

    #[test]
    fn subset_normalization_matches_full() {
        // Irregular spacing, so every origin sees a different distance curve.
        let points: Vec<GeoPoint> = (0..9)
            .map(|i| GeoPoint::new(0.0, 0.01 * (i * i) as f64))
            .collect();
        let a = (0..9).map(|i| if i % 3 == 0 { 2.0 } else { 0.5 }).collect();
        let b = (0..9).map(|i| if i < 4 { 0.2 } else { 1.5 }).collect();
        let matrix = CategoryMatrix::new(vec![a, b]).unwrap();

        for x_axis in [XAxis::Distance, XAxis::Population] {
            let config = AnalysisConfig {
                metric: multiscalar_geometry::DistanceMetric::SquaredPlanar,
                x_axis,
                ..AnalysisConfig::default()
            };
            let analyzer = Analyzer::new(&points, &matrix, config).unwrap();
            let full = analyzer.distortion_coefficients().unwrap();
            let subset = analyzer.distortion_coefficients_for(&[8, 2]).unwrap();
            let partial = analyzer.partial_analysis(&[8]).unwrap();

            assert_eq!(subset.normalization_factor, full.normalization_factor);
            assert_eq!(partial.normalization_factor, full.normalization_factor);
            assert_eq!(subset.raw, vec![full.raw[8], full.raw[2]]);
            assert_eq!(partial.normalized[0], full.normalized[8]);
        }
    }

    #[test]
    fn empty_subset_still_normalizes() {
        let (points, matrix) = split_line(6);
        let config = AnalysisConfig {
            x_axis: XAxis::Distance,
            ..AnalysisConfig::default()
        };
        let analyzer = Analyzer::new(&points, &matrix, config).unwrap();
        let report = analyzer.distortion_coefficients_for(&[]).unwrap();
        assert!(report.raw.is_empty());
        assert!(report.normalization_factor > 0.0);
    }

    #[test]
    fn worst_x_curve_dominates_every_origin() {
        let (points, matrix) = split_line(7);
        let config = AnalysisConfig {
            x_axis: XAxis::Distance,
            ..AnalysisConfig::default()
        };
        let analyzer = Analyzer::new(&points, &matrix, config).unwrap();
        let worst = analyzer.worst_x_curve().unwrap();
        assert_eq!(worst.len(), 7);
        for origin in 0..7 {
            let o = analyzer.origin(origin).unwrap();
            assert!(o.x_values.iter().zip(&worst).all(|(x, w)| x <= w));
        }

        let ranked = Analyzer::new(&points, &matrix, AnalysisConfig::default()).unwrap();
        assert!(ranked.worst_x_curve().unwrap().is_empty());
    }
}
