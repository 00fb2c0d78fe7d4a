//! Focal distances: where a neighborhood stops being distinctive.
//!
//! For a threshold `t`, the focal rank is found by walking inward from the
//! farthest rank while the divergence stays strictly below `t`. The walk stops
//! at the first rank whose divergence is not below `t`, or at rank 0.
//!
//! ```text
//! divergence  ▲
//!             │█
//!             │██ █
//!          t ─┼──█─█───────────
//!             │   █ ██ █▁▁▁▁▁▁▁
//!             └──────┬─────────► rank
//!                    focal rank
//! ```
//!
//! The focal rank is the last rank (largest) with divergence ≥ `t`, which is
//! also the last rank where the upper envelope `M[j] = max(d[j..])` reaches
//! `t`. Lowering `t` can only move it outward.

use crate::{ThresholdSet, XValues};

/// Focal rank for one threshold.
pub fn focal_index(divergence: &[f64], threshold: f64) -> usize {
    debug_assert!(!divergence.is_empty());

    let mut idx = divergence.len() - 1;
    while idx > 0 && divergence[idx] < threshold {
        idx -= 1;
    }
    idx
}

/// Focal rank for every threshold, each resolved independently.
pub fn focal_indexes(divergence: &[f64], thresholds: &ThresholdSet) -> Vec<usize> {
    let mut out = Vec::with_capacity(thresholds.len());
    focal_indexes_into(divergence, thresholds, &mut out);
    out
}

/// Focal rank for every threshold, written into `out`.
pub fn focal_indexes_into(divergence: &[f64], thresholds: &ThresholdSet, out: &mut Vec<usize>) {
    out.clear();
    out.extend(
        thresholds
            .values()
            .iter()
            .map(|&t| focal_index(divergence, t)),
    );
    // Thresholds ascend, so focal ranks must not.
    debug_assert!(
        out.windows(2).all(|w| w[1] <= w[0]),
        "focal ranks increase with threshold: {:?}",
        out
    );
}

/// X value at the focal rank.
pub fn focal_distance(divergence: &[f64], threshold: f64, x: XValues<'_>) -> f64 {
    x.at(focal_index(divergence, threshold))
}

/// X value at the focal rank for every threshold.
pub fn focal_distances(divergence: &[f64], thresholds: &ThresholdSet, x: XValues<'_>) -> Vec<f64> {
    focal_indexes(divergence, thresholds)
        .into_iter()
        .map(|idx| x.at(idx))
        .collect()
}

/// Running maximum of divergence from the farthest rank inward.
///
/// `envelope[j] = max(divergence[j..])`, non-increasing in `j`.
pub fn upper_envelope(divergence: &[f64]) -> Vec<f64> {
    let mut envelope = divergence.to_vec();
    for j in (0..envelope.len().saturating_sub(1)).rev() {
        envelope[j] = envelope[j].max(envelope[j + 1]);
    }
    envelope
}

/// Focal distance along the piecewise-linear upper envelope.
///
/// Between the focal rank `j` and `j + 1` the envelope falls from
/// `envelope[j] ≥ t` to `envelope[j + 1] < t`; the result is the X value where
/// that segment crosses `t`. Saturates at `x(0)` above the envelope and at
/// `x(N-1)` at or below its far end.
pub fn interpolated_focal_distance(envelope: &[f64], threshold: f64, x: XValues<'_>) -> f64 {
    debug_assert!(!envelope.is_empty());

    let above = envelope.partition_point(|&m| m >= threshold);
    if above == 0 {
        return x.at(0);
    }
    let j = above - 1;
    if j + 1 == envelope.len() {
        return x.at(j);
    }

    let (upper, lower) = (envelope[j], envelope[j + 1]);
    x.at(j) + (upper - threshold) / (upper - lower) * x.delta(j)
}

/// Interpolated focal distance for every threshold, written into `out`.
pub fn interpolated_focal_distances_into(
    envelope: &[f64],
    thresholds: &ThresholdSet,
    x: XValues<'_>,
    out: &mut Vec<f64>,
) {
    out.clear();
    out.extend(
        thresholds
            .values()
            .iter()
            .map(|&t| interpolated_focal_distance(envelope, t, x)),
    );
}
