//! Spatial points.
//!
//! A point is a (latitude, longitude) pair in degrees. The planar metric reads
//! the same pair as plain (y, x) coordinates.

/// A position on the map.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    /// Latitude in degrees (or y for planar data)
    pub lat: f64,
    /// Longitude in degrees (or x for planar data)
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new point.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Zip parallel latitude and longitude columns into points.
    ///
    /// The shorter column bounds the result.
    pub fn from_columns(lat: &[f64], lon: &[f64]) -> Vec<Self> {
        lat.iter()
            .zip(lon)
            .map(|(&lat, &lon)| Self { lat, lon })
            .collect()
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}
