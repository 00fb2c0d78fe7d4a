//! Error types for multiscalar-core.

use multiscalar_geometry::GeometryError;
use thiserror::Error;

/// Result type for multiscalar-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during a segregation analysis.
///
/// All of them are precondition failures detected before or during the
/// corresponding computation; none is recovered into a numeric output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Ranking or point-set validation failed.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Fewer than two points in the category arrays.
    #[error("need at least 2 points, got {count}")]
    TooFewPoints { count: usize },

    /// No category arrays were supplied.
    #[error("no categories supplied")]
    NoCategories,

    /// An array does not have the expected number of entries.
    #[error("{what}: expected {expected} entries, found {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// A magnitude is negative, NaN or infinite.
    #[error("category {category} at point {point} has invalid magnitude {value}")]
    InvalidMagnitude {
        category: usize,
        point: usize,
        value: f64,
    },

    /// The cumulative category total is zero, so the composition is undefined.
    #[error("undefined composition for origin {origin} at rank {rank}: all included magnitudes are zero")]
    DegenerateComposition { origin: usize, rank: usize },

    /// Every magnitude over the whole point set is zero.
    #[error("total magnitude over all points is zero")]
    EmptyPopulation,

    /// The worst-case distortion coefficient is zero.
    #[error("normalization factor is zero: the population cannot be segregated")]
    ZeroNormalization,

    /// A fixed reference distribution is malformed.
    #[error("invalid reference distribution: {0}")]
    InvalidReference(String),

    /// A convergence threshold is not a positive finite number.
    #[error("invalid convergence threshold {0}")]
    InvalidThreshold(f64),

    /// The threshold set is empty.
    #[error("threshold set is empty")]
    EmptyThresholds,

    /// An X-value sequence decreases somewhere.
    #[error("x values must be non-decreasing, violated at index {index}")]
    XValuesNotMonotonic { index: usize },

    /// More origins were requested than there are points.
    #[error("cannot sample {requested} origins from {available} points")]
    SampleTooLarge { requested: usize, available: usize },

    /// The dedicated worker pool could not be built.
    #[error("thread pool: {0}")]
    ThreadPool(String),
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        Error::ThreadPool(e.to_string())
    }
}
