//! Kullback-Leibler divergence of local compositions from a reference.
//!
//! ```text
//! D(P ‖ Q) = Σ_{k : P_k > ε} P_k · log2(P_k / max(ε, Q_k))
//! ```
//!
//! Asymmetric: `P` is always the local composition and `Q` the reference.
//! Categories absent from the neighborhood contribute nothing, and the
//! floor on `Q` keeps a category absent from the reference finite.

use crate::Trajectory;

/// Shares at or below this floor are treated as absent.
pub const SHARE_FLOOR: f64 = 1e-18;

/// Divergence of `local` from `reference`, in bits.
///
/// Never negative; rounding noise below zero is clamped away.
pub fn kl_divergence(local: &[f64], reference: &[f64]) -> f64 {
    debug_assert_eq!(local.len(), reference.len());

    let d: f64 = local
        .iter()
        .zip(reference)
        .filter(|(&p, _)| p > SHARE_FLOOR)
        .map(|(&p, &q)| p * (p / q.max(SHARE_FLOOR)).log2())
        .sum();
    d.max(0.0)
}

/// Two-category divergence of share `p` from reference share `q`.
pub fn binary_divergence(p: f64, q: f64) -> f64 {
    kl_divergence(&[p, 1.0 - p], &[q, 1.0 - q])
}

/// Divergence at every rank of `trajectory`.
pub fn divergence_trajectory(trajectory: &Trajectory, reference: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(trajectory.len());
    divergence_trajectory_into(trajectory, reference, &mut out);
    out
}

/// Divergence at every rank of `trajectory`, written into `out`.
pub fn divergence_trajectory_into(trajectory: &Trajectory, reference: &[f64], out: &mut Vec<f64>) {
    out.clear();
    out.extend(
        trajectory
            .compositions()
            .map(|composition| kl_divergence(composition, reference)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CategoryMatrix, DegeneratePolicy};
    use proptest::prelude::*;

    #[test]
    fn identical_distributions_have_zero_divergence() {
        let p = [0.2, 0.3, 0.5];
        assert_eq!(kl_divergence(&p, &p), 0.0);
    }

    #[test]
    fn pure_composition_against_even_split_is_one_bit() {
        assert!((kl_divergence(&[1.0, 0.0], &[0.5, 0.5]) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn divergence_is_asymmetric() {
        let p = [0.9, 0.1];
        let q = [0.5, 0.5];
        assert!((kl_divergence(&p, &q) - kl_divergence(&q, &p)).abs() > 1e-3);
    }

    #[test]
    fn absent_local_category_contributes_nothing() {
        let d = kl_divergence(&[1.0, 0.0, 0.0], &[0.25, 0.25, 0.5]);
        assert!((d - 2.0).abs() < 1e-15);
    }

    #[test]
    fn absent_reference_category_stays_finite() {
        let d = kl_divergence(&[0.5, 0.5], &[1.0, 0.0]);
        assert!(d.is_finite());
        assert!(d > 10.0);
    }

    #[test]
    fn binary_matches_general_form() {
        assert_eq!(binary_divergence(0.7, 0.4), kl_divergence(&[0.7, 0.3], &[0.4, 0.6]));
        assert_eq!(binary_divergence(0.4, 0.4), 0.0);
    }

    #[test]
    fn trajectory_ends_at_zero_against_its_own_end() {
        let m = CategoryMatrix::new(vec![vec![3.0, 1.0, 0.0, 2.0], vec![0.0, 2.0, 5.0, 1.0]]).unwrap();
        let t = Trajectory::build(&m, &[0, 1, 2, 3], DegeneratePolicy::Fail).unwrap();
        let d = divergence_trajectory(&t, t.last());
        assert_eq!(d.len(), 4);
        assert_eq!(*d.last().unwrap(), 0.0);
        assert!(d[0] > d[3]);
    }

    fn distribution(len: usize) -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(0.0f64..1.0, len).prop_filter_map("non-zero mass", |v| {
            let total: f64 = v.iter().sum();
            (total > 1e-6).then(|| v.iter().map(|x| x / total).collect())
        })
    }

    proptest! {
        #[test]
        fn divergence_non_negative(
            (p, q) in (2usize..12).prop_flat_map(|k| (distribution(k), distribution(k)))
        ) {
            prop_assert!(kl_divergence(&p, &q) >= 0.0);
        }
    }
}
