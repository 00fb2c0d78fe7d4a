//! Distance strategies.
//!
//! Only the relative order of distances matters for ranking, so the two
//! strategies are interchangeable downstream. The geodesic one additionally
//! yields meters, which makes it usable as a physical X axis.

use crate::GeoPoint;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Smallest geodesic distance between two distinct points, in meters.
pub const GEODESIC_FLOOR: f64 = 1.0;

/// Smallest squared planar distance between two distinct points.
///
/// Departs from the one-unit floor the geodesic metric applies: squared
/// degree deltas between neighboring points are far below 1, and a one-unit
/// floor would collapse every planar distance onto the same value.
pub const PLANAR_FLOOR: f64 = 1e-12;

/// How distances between points are measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DistanceMetric {
    /// Squared Euclidean delta of the raw coordinates. Cheap and scale-free.
    SquaredPlanar,
    /// Great-circle (haversine) distance in meters.
    #[default]
    Haversine,
}

impl DistanceMetric {
    /// Floor applied between distinct points.
    pub const fn floor(&self) -> f64 {
        match self {
            Self::SquaredPlanar => PLANAR_FLOOR,
            Self::Haversine => GEODESIC_FLOOR,
        }
    }

    /// Unclamped distance. Symmetric, zero for identical coordinates.
    pub fn raw(&self, a: GeoPoint, b: GeoPoint) -> f64 {
        match self {
            Self::SquaredPlanar => {
                let d_lat = a.lat - b.lat;
                let d_lon = a.lon - b.lon;
                d_lat * d_lat + d_lon * d_lon
            }
            Self::Haversine => haversine(a, b),
        }
    }

    /// Distance between two distinct points, clamped to [`Self::floor`].
    #[inline]
    pub fn between(&self, a: GeoPoint, b: GeoPoint) -> f64 {
        self.raw(a, b).max(self.floor())
    }
}

fn haversine(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).max(0.0).sqrt());

    EARTH_RADIUS_M * c
}
