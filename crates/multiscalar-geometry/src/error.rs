//! Error types for multiscalar-geometry.

use thiserror::Error;

/// Result type for geometry operations.
pub type Result<T> = std::result::Result<T, GeometryError>;

/// Errors that can occur while ranking points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Fewer than two points were supplied.
    #[error("need at least 2 points to rank neighbors, got {count}")]
    TooFewPoints { count: usize },

    /// An origin index does not address a point.
    #[error("origin {origin} out of range for {len} points")]
    OriginOutOfRange { origin: usize, len: usize },

    /// A latitude or longitude is NaN or infinite.
    #[error("point {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },
}
