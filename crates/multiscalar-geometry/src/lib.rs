//! Multiscalar Geometry
//!
//! Distances between spatial points and nearest-neighbor rank orderings.
//!
//! # Rank Orderings
//!
//! For an origin point `i`, the rank ordering is the permutation of all point
//! indices sorted by ascending distance from `i`. Rank 0 is always the origin
//! itself, rank N-1 is the farthest point. Ties are broken by point index so
//! that an ordering is a pure function of the coordinates.
//!
//! ```text
//! origin ─► rank 0 (self, distance 0)
//!           rank 1 (nearest other point, distance ≥ floor)
//!           ...
//!           rank N-1 (farthest point)
//! ```
//!
//! # Distance Floor
//!
//! Every distance between two distinct point indices is clamped to a strictly
//! positive floor, so coincident points never alias the origin at rank 0.

mod distance;
mod error;
mod point;
mod ranking;

pub use distance::{DistanceMetric, EARTH_RADIUS_M, GEODESIC_FLOOR, PLANAR_FLOOR};
pub use error::{GeometryError, Result};
pub use point::GeoPoint;
pub use ranking::{NeighborRanker, Ranking};

/// Minimum number of points for a ranking to carry any information.
pub const MIN_POINTS: usize = 2;
