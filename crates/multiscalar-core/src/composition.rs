//! Per-category magnitudes over a point set.
//!
//! The category count is a runtime dimension: a [`CategoryMatrix`] is
//! validated once at construction (same length for every category, at least
//! two points, finite non-negative magnitudes) and read-only afterwards.

use crate::{Error, Result};

/// K category arrays of N non-negative magnitudes each.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMatrix {
    categories: Vec<Vec<f64>>,
    num_points: usize,
}

impl CategoryMatrix {
    /// Validate and wrap category arrays (one `Vec` per category).
    pub fn new(categories: Vec<Vec<f64>>) -> Result<Self> {
        let first = categories.first().ok_or(Error::NoCategories)?;
        let num_points = first.len();
        if num_points < 2 {
            return Err(Error::TooFewPoints { count: num_points });
        }

        for (category, values) in categories.iter().enumerate() {
            if values.len() != num_points {
                return Err(Error::LengthMismatch {
                    what: "category magnitudes",
                    expected: num_points,
                    found: values.len(),
                });
            }
            if let Some((point, &value)) = values
                .iter()
                .enumerate()
                .find(|(_, v)| !v.is_finite() || **v < 0.0)
            {
                return Err(Error::InvalidMagnitude {
                    category,
                    point,
                    value,
                });
            }
        }

        Ok(Self {
            categories,
            num_points,
        })
    }

    /// Number of categories (K).
    pub fn num_categories(&self) -> usize {
        self.categories.len()
    }

    /// Number of points (N).
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// Magnitudes of one category over all points.
    pub fn category(&self, k: usize) -> &[f64] {
        &self.categories[k]
    }

    /// Iterate over category arrays.
    pub fn categories(&self) -> impl Iterator<Item = &[f64]> {
        self.categories.iter().map(Vec::as_slice)
    }

    /// Magnitude of category `k` at `point`.
    #[inline]
    pub fn magnitude(&self, k: usize, point: usize) -> f64 {
        self.categories[k][point]
    }

    /// Sum of all category magnitudes at one point.
    pub fn point_total(&self, point: usize) -> f64 {
        self.categories.iter().map(|c| c[point]).sum()
    }

    /// Per-point population: the sum of every category at each point.
    pub fn populations(&self) -> Vec<f64> {
        (0..self.num_points).map(|i| self.point_total(i)).collect()
    }

    /// Per-category total over the whole point set.
    pub fn category_totals(&self) -> Vec<f64> {
        self.categories.iter().map(|c| c.iter().sum()).collect()
    }

    /// Total magnitude over every category and point.
    pub fn total(&self) -> f64 {
        self.category_totals().iter().sum()
    }

    /// Global category shares, summing to 1.
    ///
    /// Fails when every magnitude is zero.
    pub fn global_distribution(&self) -> Result<Vec<f64>> {
        let totals = self.category_totals();
        let total: f64 = totals.iter().sum();
        if total <= 0.0 {
            return Err(Error::EmptyPopulation);
        }
        Ok(totals.into_iter().map(|t| t / total).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CategoryMatrix {
        CategoryMatrix::new(vec![vec![1.0, 2.0, 3.0], vec![3.0, 2.0, 1.0]]).unwrap()
    }

    #[test]
    fn dimensions() {
        let m = sample();
        assert_eq!(m.num_categories(), 2);
        assert_eq!(m.num_points(), 3);
        assert_eq!(m.magnitude(1, 0), 3.0);
    }

    #[test]
    fn totals_and_populations() {
        let m = sample();
        assert_eq!(m.populations(), vec![4.0, 4.0, 4.0]);
        assert_eq!(m.category_totals(), vec![6.0, 6.0]);
        assert_eq!(m.total(), 12.0);
        assert_eq!(m.global_distribution().unwrap(), vec![0.5, 0.5]);
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(CategoryMatrix::new(vec![]).unwrap_err(), Error::NoCategories);
    }

    #[test]
    fn rejects_singleton() {
        assert_eq!(
            CategoryMatrix::new(vec![vec![1.0], vec![2.0]]).unwrap_err(),
            Error::TooFewPoints { count: 1 }
        );
    }

    #[test]
    fn rejects_ragged_categories() {
        assert!(matches!(
            CategoryMatrix::new(vec![vec![1.0, 2.0], vec![1.0]]),
            Err(Error::LengthMismatch { expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn rejects_negative_and_nan() {
        assert!(matches!(
            CategoryMatrix::new(vec![vec![1.0, -2.0]]),
            Err(Error::InvalidMagnitude { category: 0, point: 1, .. })
        ));
        assert!(matches!(
            CategoryMatrix::new(vec![vec![1.0, 1.0], vec![f64::NAN, 0.0]]),
            Err(Error::InvalidMagnitude { category: 1, point: 0, .. })
        ));
    }

    #[test]
    fn all_zero_has_no_distribution() {
        let m = CategoryMatrix::new(vec![vec![0.0, 0.0], vec![0.0, 0.0]]).unwrap();
        assert_eq!(m.global_distribution().unwrap_err(), Error::EmptyPopulation);
    }
}
