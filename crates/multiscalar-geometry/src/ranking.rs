//! Nearest-neighbor rank orderings.
//!
//! A [`Ranking`] is the trajectory of inclusion for one origin: the order in
//! which points join the neighborhood as it grows. Rankings for different
//! origins share nothing mutable and are computed in parallel.

use rayon::prelude::*;

use crate::{DistanceMetric, GeoPoint, GeometryError, Result, MIN_POINTS};

/// Rank ordering of points around one origin.
///
/// The buffers are reused by [`NeighborRanker::rank_into`], so a worker can
/// rank many origins without reallocating.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    origin: usize,
    /// Distance to each candidate, in candidate order
    row: Vec<f64>,
    /// Point indices by ascending distance
    order: Vec<usize>,
    /// Distance at each rank
    distances: Vec<f64>,
}

impl Ranking {
    /// Empty ranking with room for `len` points.
    pub fn with_capacity(len: usize) -> Self {
        Self {
            origin: 0,
            row: Vec::with_capacity(len),
            order: Vec::with_capacity(len),
            distances: Vec::with_capacity(len),
        }
    }

    /// The origin point index.
    pub fn origin(&self) -> usize {
        self.origin
    }

    /// Point indices sorted by ascending distance. Rank 0 is the origin.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Distance at each rank (non-decreasing).
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Distances in candidate order (point order for a full ranking).
    pub fn distance_row(&self) -> &[f64] {
        &self.row
    }

    /// Number of ranked points.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when nothing has been ranked.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Ranks a fixed point set around arbitrary origins.
#[derive(Debug, Clone, Copy)]
pub struct NeighborRanker<'a> {
    points: &'a [GeoPoint],
    metric: DistanceMetric,
}

impl<'a> NeighborRanker<'a> {
    /// Create a ranker over `points`.
    ///
    /// Fails on fewer than two points or any non-finite coordinate.
    pub fn new(points: &'a [GeoPoint], metric: DistanceMetric) -> Result<Self> {
        if points.len() < MIN_POINTS {
            return Err(GeometryError::TooFewPoints {
                count: points.len(),
            });
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(GeometryError::NonFiniteCoordinate { index });
        }
        Ok(Self { points, metric })
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: construction requires at least two points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The distance strategy in use.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// The ranked point set.
    pub fn points(&self) -> &'a [GeoPoint] {
        self.points
    }

    /// Distance from `origin` to every point, indexed by point.
    ///
    /// The origin's own entry is 0; every other entry is at least the
    /// metric's floor.
    pub fn distance_row(&self, origin: usize) -> Result<Vec<f64>> {
        self.check_origin(origin)?;
        let o = self.points[origin];
        Ok(self
            .points
            .iter()
            .enumerate()
            .map(|(j, &p)| self.distance(origin, o, j, p))
            .collect())
    }

    /// Rank every point around `origin`.
    pub fn rank(&self, origin: usize) -> Result<Ranking> {
        let mut ranking = Ranking::with_capacity(self.points.len());
        self.rank_into(origin, &mut ranking)?;
        Ok(ranking)
    }

    /// Rank every point around `origin`, reusing `out`'s buffers.
    pub fn rank_into(&self, origin: usize, out: &mut Ranking) -> Result<()> {
        self.check_origin(origin)?;
        self.fill(origin, None, out);
        Ok(())
    }

    /// Rank only `candidates` around `origin`.
    ///
    /// Ties are broken by position in `candidates`; pass them sorted to get
    /// index order. The origin sits at rank 0 when it is a candidate.
    pub fn rank_among(&self, origin: usize, candidates: &[usize]) -> Result<Ranking> {
        self.check_origin(origin)?;
        for &c in candidates {
            self.check_origin(c)?;
        }
        let mut ranking = Ranking::with_capacity(candidates.len());
        self.fill(origin, Some(candidates), &mut ranking);
        Ok(ranking)
    }

    /// Rank the full point set around each of `origins`, in parallel.
    ///
    /// The result is in the same order as `origins`.
    pub fn rank_origins(&self, origins: &[usize]) -> Result<Vec<Ranking>> {
        origins.par_iter().map(|&origin| self.rank(origin)).collect()
    }

    fn check_origin(&self, origin: usize) -> Result<()> {
        if origin < self.points.len() {
            Ok(())
        } else {
            Err(GeometryError::OriginOutOfRange {
                origin,
                len: self.points.len(),
            })
        }
    }

    #[inline]
    fn distance(&self, origin: usize, o: GeoPoint, j: usize, p: GeoPoint) -> f64 {
        if j == origin {
            0.0
        } else {
            self.metric.between(o, p)
        }
    }

    fn fill(&self, origin: usize, candidates: Option<&[usize]>, out: &mut Ranking) {
        let o = self.points[origin];
        out.origin = origin;
        out.row.clear();
        out.order.clear();
        out.distances.clear();

        match candidates {
            None => out.row.extend(
                self.points
                    .iter()
                    .enumerate()
                    .map(|(j, &p)| self.distance(origin, o, j, p)),
            ),
            Some(candidates) => out.row.extend(
                candidates
                    .iter()
                    .map(|&j| self.distance(origin, o, j, self.points[j])),
            ),
        }

        // Sort candidate positions; position order breaks ties.
        out.order.extend(0..out.row.len());
        let row = &out.row;
        out.order
            .sort_unstable_by(|&a, &b| row[a].total_cmp(&row[b]).then(a.cmp(&b)));
        out.distances.extend(out.order.iter().map(|&a| row[a]));

        if let Some(candidates) = candidates {
            for slot in out.order.iter_mut() {
                *slot = candidates[*slot];
            }
        }
    }
}
