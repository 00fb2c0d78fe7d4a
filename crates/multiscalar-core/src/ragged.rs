//! Irregular 2D arrays.
//!
//! Rows of different lengths are stored as one flat value array plus a row
//! offset index, the layout the persistence layer writes:
//!
//! ```text
//! values:  [a0 a1 a2 | b0 | c0 c1]
//! offsets: [0,        3,   4,     6]
//! ```

use serde::Serialize;

/// Flat values plus `len + 1` row offsets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ragged<T> {
    values: Vec<T>,
    offsets: Vec<usize>,
}

impl<T> Default for Ragged<T> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            offsets: vec![0],
        }
    }
}

impl<T> Ragged<T> {
    /// Empty array.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one row.
    pub fn push_row<I: IntoIterator<Item = T>>(&mut self, row: I) {
        self.values.extend(row);
        self.offsets.push(self.values.len());
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// True when there are no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row `i`.
    pub fn row(&self, i: usize) -> &[T] {
        &self.values[self.offsets[i]..self.offsets[i + 1]]
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.offsets.windows(2).map(|w| &self.values[w[0]..w[1]])
    }

    /// All values, row after row.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Row start offsets followed by the total length.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Every row has the same length, so the data is a plain 2D array.
    pub fn is_uniform(&self) -> bool {
        let mut lengths = self.offsets.windows(2).map(|w| w[1] - w[0]);
        match lengths.next() {
            Some(first) => lengths.all(|l| l == first),
            None => true,
        }
    }
}

impl<T, R> FromIterator<R> for Ragged<T>
where
    R: IntoIterator<Item = T>,
{
    fn from_iter<I: IntoIterator<Item = R>>(rows: I) -> Self {
        let mut ragged = Self::new();
        for row in rows {
            ragged.push_row(row);
        }
        ragged
    }
}
