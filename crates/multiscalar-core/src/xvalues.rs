//! X axes for focal distances and distortion integrals.
//!
//! By default the X value of a rank is the rank itself. A caller may instead
//! measure neighborhoods by physical distance or by accumulated population;
//! integrals then use the local delta between consecutive X values.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Which quantity measures how far a neighborhood extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XAxis {
    /// Rank index (0, 1, 2, ...)
    #[default]
    Rank,
    /// Distance from the origin at each rank
    Distance,
    /// Cumulative population at each rank
    Population,
}

/// X values along one trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum XValues<'a> {
    /// X equals the rank index; every step is 1.
    Rank,
    /// One non-decreasing value per rank.
    Explicit(&'a [f64]),
}

impl<'a> XValues<'a> {
    /// Validate an explicit sequence against a trajectory length.
    pub fn explicit(values: &'a [f64], len: usize) -> Result<Self> {
        if values.len() != len {
            return Err(Error::LengthMismatch {
                what: "x values",
                expected: len,
                found: values.len(),
            });
        }
        check_non_decreasing(values)?;
        Ok(Self::Explicit(values))
    }

    /// X value at `rank`.
    #[inline]
    pub fn at(&self, rank: usize) -> f64 {
        match self {
            Self::Rank => rank as f64,
            Self::Explicit(values) => values[rank],
        }
    }

    /// Step from `rank` to `rank + 1`.
    #[inline]
    pub fn delta(&self, rank: usize) -> f64 {
        match self {
            Self::Rank => 1.0,
            Self::Explicit(values) => values[rank + 1] - values[rank],
        }
    }
}

/// Fail on the first value smaller than its predecessor, or on NaN.
pub fn check_non_decreasing(values: &[f64]) -> Result<()> {
    if let Some(index) = values.iter().position(|v| v.is_nan()) {
        return Err(Error::XValuesNotMonotonic { index });
    }
    match values.windows(2).position(|w| w[1] < w[0]) {
        Some(i) => Err(Error::XValuesNotMonotonic { index: i + 1 }),
        None => Ok(()),
    }
}

/// Fold `row` into `acc` by elementwise maximum.
///
/// An empty accumulator adopts the row.
pub fn merge_worst(acc: &mut Vec<f64>, row: &[f64]) {
    if acc.is_empty() {
        acc.extend_from_slice(row);
        return;
    }
    debug_assert_eq!(acc.len(), row.len());
    for (a, &r) in acc.iter_mut().zip(row) {
        *a = a.max(r);
    }
}

/// Elementwise maximum of several X sequences: the "worst" curve, where
/// every rank is reached as late as any origin reaches it.
pub fn worst_xvalues(rows: &[Vec<f64>]) -> Vec<f64> {
    rows.par_iter()
        .fold(Vec::new, |mut acc, row| {
            merge_worst(&mut acc, row);
            acc
        })
        .reduce(Vec::new, |mut a, b| {
            merge_worst(&mut a, &b);
            a
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_axis() {
        let x = XValues::Rank;
        assert_eq!(x.at(7), 7.0);
        assert_eq!(x.delta(3), 1.0);
    }

    #[test]
    fn explicit_axis_uses_local_deltas() {
        let values = [0.0, 1.0, 4.0, 9.0];
        let x = XValues::explicit(&values, 4).unwrap();
        assert_eq!(x.at(2), 4.0);
        assert_eq!(x.delta(2), 5.0);
    }

    #[test]
    fn explicit_axis_checks_length_and_order() {
        assert!(matches!(
            XValues::explicit(&[0.0, 1.0], 3),
            Err(Error::LengthMismatch { expected: 3, found: 2, .. })
        ));
        assert_eq!(
            XValues::explicit(&[0.0, 2.0, 1.0], 3).unwrap_err(),
            Error::XValuesNotMonotonic { index: 2 }
        );
        assert!(XValues::explicit(&[0.0, f64::NAN], 2).is_err());
    }

    #[test]
    fn plateaus_allowed() {
        assert!(check_non_decreasing(&[0.0, 1.0, 1.0, 3.0]).is_ok());
    }

    #[test]
    fn worst_curve_is_elementwise_max() {
        let rows = vec![vec![0.0, 1.0, 5.0], vec![0.0, 3.0, 4.0], vec![0.0, 2.0, 6.0]];
        assert_eq!(worst_xvalues(&rows), vec![0.0, 3.0, 6.0]);
        assert!(worst_xvalues(&[]).is_empty());
    }
}
