//! Worst-case normalization.
//!
//! The normalization factor is the distortion coefficient of the most
//! segregated arrangement the population admits, built without geography:
//!
//! 1. Sort population buckets (points) from smallest to largest.
//! 2. Sort categories from smallest to largest global share.
//! 3. Fill buckets in order, pouring each category in whole before moving
//!    to the next, so the smallest minorities are met first and alone.
//!
//! The divergence of that trajectory from the global distribution, integrated
//! with the envelope path over the worst X curve, divides every real
//! coefficient.

use tracing::debug;

use crate::distortion::envelope_distortion;
use crate::divergence::kl_divergence;
use crate::{DegeneratePolicy, Error, Result, XValues};

/// Divergence trajectory of the worst-case arrangement.
///
/// `category_totals` holds one global total per category, `populations` one
/// bucket size per point. Leading empty buckets follow `policy`.
pub fn worst_case_divergence(
    category_totals: &[f64],
    populations: &[f64],
    policy: DegeneratePolicy,
) -> Result<Vec<f64>> {
    let k_count = category_totals.len();
    if k_count == 0 {
        return Err(Error::NoCategories);
    }
    let grand_total: f64 = category_totals.iter().sum();
    if grand_total <= 0.0 || populations.is_empty() {
        return Err(Error::EmptyPopulation);
    }

    let mut shares: Vec<f64> = category_totals.iter().map(|t| t / grand_total).collect();
    shares.sort_by(f64::total_cmp);

    let total_population: f64 = populations.iter().sum();
    let mut capacity: Vec<f64> = shares.iter().map(|s| s * total_population).collect();

    let mut order: Vec<usize> = (0..populations.len()).collect();
    order.sort_by(|&a, &b| populations[a].total_cmp(&populations[b]).then(a.cmp(&b)));

    let uniform = 1.0 / k_count as f64;
    let mut accumulated = vec![0.0; k_count];
    let mut composition = vec![0.0; k_count];
    let mut accumulated_total = 0.0;
    let mut current = 0;
    let mut divergence = Vec::with_capacity(populations.len());

    for (rank, &point) in order.iter().enumerate() {
        let mut remaining = populations[point];
        accumulated_total += remaining;

        while current + 1 < k_count && capacity[current] < remaining {
            accumulated[current] += capacity[current];
            remaining -= capacity[current];
            capacity[current] = 0.0;
            current += 1;
        }
        accumulated[current] += remaining;
        capacity[current] -= remaining;

        if accumulated_total > 0.0 {
            for (c, a) in composition.iter_mut().zip(&accumulated) {
                *c = a / accumulated_total;
            }
        } else {
            match policy {
                DegeneratePolicy::Fail => {
                    return Err(Error::DegenerateComposition { origin: point, rank })
                }
                DegeneratePolicy::Uniform => composition.fill(uniform),
            }
        }

        divergence.push(kl_divergence(&composition, &shares));
    }

    Ok(divergence)
}

/// Distortion coefficient of the worst-case trajectory.
///
/// Fails with [`Error::ZeroNormalization`] when the worst case shows no
/// segregation at all (a single category, or no X extent).
pub fn normalization_factor(worst_divergence: &[f64], x: XValues<'_>) -> Result<f64> {
    let factor = envelope_distortion(worst_divergence, x);
    debug!(factor, ranks = worst_divergence.len(), "worst-case distortion");

    if factor > 0.0 && factor.is_finite() {
        Ok(factor)
    } else {
        Err(Error::ZeroNormalization)
    }
}
