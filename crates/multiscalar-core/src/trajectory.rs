//! Running category compositions along a rank ordering.
//!
//! At rank `r` the composition is the share of each category among the
//! `r + 1` nearest points:
//!
//! ```text
//! share[k][r] = Σ_{j ≤ r} m[k][order[j]] / Σ_k Σ_{j ≤ r} m[k][order[j]]
//! ```
//!
//! Shares are stored rank-major, so the composition at one rank is a
//! contiguous slice of length K.

use serde::{Deserialize, Serialize};

use crate::{CategoryMatrix, Error, Result};

/// What to do when a rank's cumulative total is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Report [`Error::DegenerateComposition`].
    #[default]
    Fail,
    /// Substitute the uniform composition 1/K.
    Uniform,
}

/// Composition vector at every rank for one origin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    num_categories: usize,
    /// Rank-major shares, `len * num_categories` values
    shares: Vec<f64>,
    /// Cumulative grand total at each rank
    totals: Vec<f64>,
    running: Vec<f64>,
}

impl Trajectory {
    /// Empty trajectory with room for `num_points` ranks of `num_categories`.
    pub fn with_capacity(num_categories: usize, num_points: usize) -> Self {
        Self {
            num_categories,
            shares: Vec::with_capacity(num_categories * num_points),
            totals: Vec::with_capacity(num_points),
            running: Vec::with_capacity(num_categories),
        }
    }

    /// Build the trajectory of `matrix` along `order`.
    ///
    /// `order[0]` is taken as the origin when reporting a degenerate rank.
    pub fn build(matrix: &CategoryMatrix, order: &[usize], policy: DegeneratePolicy) -> Result<Self> {
        let mut trajectory = Self::with_capacity(matrix.num_categories(), order.len());
        trajectory.rebuild(matrix, order, policy)?;
        Ok(trajectory)
    }

    /// Rebuild in place, reusing buffers.
    pub fn rebuild(
        &mut self,
        matrix: &CategoryMatrix,
        order: &[usize],
        policy: DegeneratePolicy,
    ) -> Result<()> {
        let k_count = matrix.num_categories();
        self.num_categories = k_count;
        self.shares.clear();
        self.totals.clear();
        self.running.clear();
        self.running.resize(k_count, 0.0);

        let uniform = 1.0 / k_count as f64;
        let mut total = 0.0;

        for (rank, &point) in order.iter().enumerate() {
            for (k, sum) in self.running.iter_mut().enumerate() {
                let m = matrix.magnitude(k, point);
                *sum += m;
                total += m;
            }
            self.totals.push(total);

            if total > 0.0 {
                self.shares.extend(self.running.iter().map(|s| s / total));
            } else {
                match policy {
                    DegeneratePolicy::Fail => {
                        return Err(Error::DegenerateComposition {
                            origin: order[0],
                            rank,
                        })
                    }
                    DegeneratePolicy::Uniform => {
                        self.shares.extend(std::iter::repeat(uniform).take(k_count))
                    }
                }
            }
        }

        Ok(())
    }

    /// Number of ranks.
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    /// True when no rank has been built.
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Number of categories.
    pub fn num_categories(&self) -> usize {
        self.num_categories
    }

    /// Composition at `rank`.
    #[inline]
    pub fn composition(&self, rank: usize) -> &[f64] {
        let k = self.num_categories;
        &self.shares[rank * k..(rank + 1) * k]
    }

    /// Compositions at every rank, nearest first.
    pub fn compositions(&self) -> impl Iterator<Item = &[f64]> {
        self.shares.chunks_exact(self.num_categories.max(1))
    }

    /// Composition of the full neighborhood (farthest rank).
    pub fn last(&self) -> &[f64] {
        self.composition(self.len() - 1)
    }

    /// Share of category `k` at every rank.
    pub fn category_series(&self, k: usize) -> impl Iterator<Item = f64> + '_ {
        self.compositions().map(move |c| c[k])
    }

    /// Cumulative population (sum of every category) at every rank.
    pub fn accumulated_totals(&self) -> &[f64] {
        &self.totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn matrix() -> CategoryMatrix {
        CategoryMatrix::new(vec![vec![10.0, 0.0, 5.0], vec![0.0, 10.0, 5.0]]).unwrap()
    }

    #[test]
    fn running_shares() {
        let t = Trajectory::build(&matrix(), &[0, 1, 2], DegeneratePolicy::Fail).unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.composition(0), &[1.0, 0.0]);
        assert_eq!(t.composition(1), &[0.5, 0.5]);
        assert_eq!(t.last(), &[0.5, 0.5]);
        assert_eq!(t.accumulated_totals(), &[10.0, 20.0, 30.0]);
    }

    #[test]
    fn category_series_follows_order() {
        let t = Trajectory::build(&matrix(), &[1, 2, 0], DegeneratePolicy::Fail).unwrap();
        let first: Vec<f64> = t.category_series(0).collect();
        assert_eq!(first, vec![0.0, 5.0 / 20.0, 0.5]);
    }

    #[test]
    fn zero_total_fails_by_default() {
        let m = CategoryMatrix::new(vec![vec![0.0, 1.0], vec![0.0, 1.0]]).unwrap();
        assert_eq!(
            Trajectory::build(&m, &[0, 1], DegeneratePolicy::Fail).unwrap_err(),
            Error::DegenerateComposition { origin: 0, rank: 0 }
        );
    }

    #[test]
    fn zero_total_uniform_policy() {
        let m = CategoryMatrix::new(vec![vec![0.0, 1.0], vec![0.0, 3.0]]).unwrap();
        let t = Trajectory::build(&m, &[0, 1], DegeneratePolicy::Uniform).unwrap();
        assert_eq!(t.composition(0), &[0.5, 0.5]);
        assert_eq!(t.composition(1), &[0.25, 0.75]);
    }

    #[test]
    fn rebuild_matches_fresh_build() {
        let m = matrix();
        let mut t = Trajectory::build(&m, &[0, 1, 2], DegeneratePolicy::Fail).unwrap();
        t.rebuild(&m, &[2, 0, 1], DegeneratePolicy::Fail).unwrap();
        assert_eq!(t, Trajectory::build(&m, &[2, 0, 1], DegeneratePolicy::Fail).unwrap());
    }

    proptest! {
        #[test]
        fn shares_sum_to_one(
            columns in prop::collection::vec(prop::collection::vec(0.1f64..1000.0, 12), 1..8),
        ) {
            let m = CategoryMatrix::new(columns).unwrap();
            let order: Vec<usize> = (0..m.num_points()).rev().collect();
            let t = Trajectory::build(&m, &order, DegeneratePolicy::Fail).unwrap();
            for composition in t.compositions() {
                let sum: f64 = composition.iter().sum();
                prop_assert!((sum - 1.0).abs() < 1e-12);
            }
        }
    }
}
