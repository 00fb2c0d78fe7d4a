//! Distortion coefficients: the area under focal distance over all tolerances.
//!
//! Two paths compute the same quantity:
//!
//! - **Threshold path**: trapezoidal integral of focal distance (measured from
//!   the origin's own X value) over an explicit threshold axis.
//! - **Envelope path**: one inward scan of the divergence trajectory that
//!   integrates its running maximum over the X axis.
//!
//! They agree by the co-area identity: for the non-increasing envelope `M`,
//!
//! ```text
//! ∫ M(x) dx  =  ∫ |{x : M(x) ≥ t}| dt  =  ∫ (F(t) - x₀) dt
//! ```
//!
//! where `F(t)` is the interpolated focal distance. The threshold path only
//! covers the threshold range it is given, so agreement is exact when the
//! thresholds include every envelope breakpoint and span down to zero.

use crate::{ThresholdSet, XValues};

/// Trapezoidal integral of `y` over `x`.
pub fn trapezoid(y: &[f64], x: &[f64]) -> f64 {
    debug_assert_eq!(y.len(), x.len());

    y.windows(2)
        .zip(x.windows(2))
        .map(|(y, x)| (y[0] + y[1]) / 2.0 * (x[1] - x[0]))
        .sum()
}

/// Threshold path: integrate `focal_distances - origin_x` over `thresholds`.
///
/// `focal_distances[i]` belongs to `thresholds.values()[i]`.
pub fn threshold_distortion(thresholds: &ThresholdSet, focal_distances: &[f64], origin_x: f64) -> f64 {
    debug_assert_eq!(thresholds.len(), focal_distances.len());

    thresholds
        .values()
        .windows(2)
        .zip(focal_distances.windows(2))
        .map(|(t, f)| ((f[0] - origin_x) + (f[1] - origin_x)) / 2.0 * (t[1] - t[0]))
        .sum()
}

/// Envelope (fast) path: area under the running maximum of divergence.
///
/// Scans from the farthest rank inward, adding a trapezoid of the previous
/// and current running maximum times the local X step.
pub fn envelope_distortion(divergence: &[f64], x: XValues<'_>) -> f64 {
    let Some((&last, _)) = divergence.split_last() else {
        return 0.0;
    };

    let mut running_max = last;
    let mut area = 0.0;
    for j in (0..divergence.len() - 1).rev() {
        let previous = running_max;
        running_max = running_max.max(divergence[j]);
        area += (previous + running_max) / 2.0 * x.delta(j);
    }
    area
}
