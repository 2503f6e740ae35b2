//! Pairwise expected-similarity metric.
//!
//! Scores an ordered pair of drone states with one number in `[0, 1]`
//! (given weights summing to at most 1). Three rules apply in order:
//!
//! 1. **Identity**: same `anchor_id` → exactly 1.0
//! 2. **Cross-environment**: different `env_name` → exactly 0.0
//! 3. **General**: weighted sum of a position channel and a rotation channel
//!
//! The general rule fuses two metric spaces:
//!
//! ```text
//! scale   = Wp / (1 + avg_speed * Wv)
//! pos_sim = exp(-scale * ||p1 - p2||)
//! rot_sim = clamp(|dot(q1_hat, q2_hat)|, 0, 1)
//! score   = Wpos * pos_sim + Wrot * rot_sim
//! ```
//!
//! The absolute value in the rotation channel folds antipodal quaternions
//! (q and -q encode the same 3D rotation); the clamp absorbs float overshoot
//! just past 1.0 after normalization.

use crate::config::SimilarityWeights;
use crate::record::StateRecord;

/// Euclidean norm of a 3-vector.
pub fn norm3(v: &[f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Dot product of two quaternions as plain 4-vectors.
pub fn dot4(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

/// Normalize a quaternion to unit length.
///
/// A quaternion with zero norm is returned unchanged: telemetry rows can
/// carry an all-zero orientation, and dotting against the zero vector later
/// yields a rotation similarity of 0 without ever dividing by zero.
pub fn normalize_quaternion(q: [f64; 4]) -> [f64; 4] {
    let norm = dot4(&q, &q).sqrt();
    if norm > 0.0 {
        [q[0] / norm, q[1] / norm, q[2] / norm, q[3] / norm]
    } else {
        q
    }
}

/// Expected similarity between two drone states.
///
/// Pure function of the two records and the weights; no failure path. The
/// only degenerate input, a zero-norm quaternion, is handled by
/// [`normalize_quaternion`]. NaN or infinite fields propagate into the
/// result (except through the identity and cross-environment rules, which
/// never look at the numeric fields).
///
/// # Example
///
/// ```
/// use simprior_core::{expected_similarity, SimilarityWeights, StateRecord};
///
/// let w = SimilarityWeights::default();
/// let a = StateRecord::new("0", "canyon", [0.0; 3], [1.0, 0.0, 0.0, 0.0], [0.0; 3]);
/// let b = StateRecord::new("1", "canyon", [0.0; 3], [1.0, 0.0, 0.0, 0.0], [0.0; 3]);
///
/// // Coincident states under default weights: 0.6 * 1.0 + 0.4 * 1.0
/// assert_eq!(expected_similarity(&a, &b, &w), 1.0);
///
/// // Same anchor id wins over everything else
/// let far = StateRecord::new("0", "canyon", [900.0; 3], [0.0, 1.0, 0.0, 0.0], [9.0; 3]);
/// assert_eq!(expected_similarity(&a, &far, &w), 1.0);
/// ```
pub fn expected_similarity(a: &StateRecord, b: &StateRecord, w: &SimilarityWeights) -> f64 {
    if a.anchor_id == b.anchor_id {
        return 1.0;
    }
    if a.env_name != b.env_name {
        return 0.0;
    }

    // Position channel: distance decay with velocity-adaptive scale.
    let delta = [
        a.position[0] - b.position[0],
        a.position[1] - b.position[1],
        a.position[2] - b.position[2],
    ];
    let pos_distance = norm3(&delta);
    let avg_speed = (a.speed() + b.speed()) / 2.0;
    let scale = w.position_sensitivity / (1.0 + avg_speed * w.velocity_tolerance);
    let pos_sim = (-scale * pos_distance).exp();

    // Rotation channel: folded quaternion alignment.
    let qa = normalize_quaternion(a.orientation);
    let qb = normalize_quaternion(b.orientation);
    let rot_sim = dot4(&qa, &qb).abs().clamp(0.0, 1.0);

    pos_sim * w.position_weight + rot_sim * w.rotation_weight
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, env: &str) -> StateRecord {
        StateRecord::new(id, env, [0.0; 3], [1.0, 0.0, 0.0, 0.0], [0.0; 3])
    }

    #[test]
    fn test_identity_rule_ignores_numeric_fields() {
        let w = SimilarityWeights::default();
        let a = record("A", "forest");
        let b = StateRecord::new(
            "A",
            "forest",
            [50.0, -3.0, 12.0],
            [0.0, 0.7, 0.0, 0.7],
            [8.0, 0.0, 0.0],
        );
        assert_eq!(expected_similarity(&a, &b, &w), 1.0);
    }

    #[test]
    fn test_identity_rule_beats_environment_rule() {
        let w = SimilarityWeights::default();
        let a = record("A", "forest");
        let b = record("A", "city");
        assert_eq!(
            expected_similarity(&a, &b, &w),
            1.0,
            "identity is checked before environment"
        );
    }

    #[test]
    fn test_cross_environment_is_exact_zero() {
        let w = SimilarityWeights::default();
        let a = record("A", "forest");
        let b = record("B", "city");
        assert_eq!(expected_similarity(&a, &b, &w), 0.0);
    }

    #[test]
    fn test_cross_environment_zero_even_with_nan_fields() {
        let w = SimilarityWeights::default();
        let a = record("A", "forest");
        let b = StateRecord::new(
            "B",
            "city",
            [f64::NAN; 3],
            [f64::NAN; 4],
            [f64::INFINITY, 0.0, 0.0],
        );
        assert_eq!(
            expected_similarity(&a, &b, &w),
            0.0,
            "rule fires before any arithmetic"
        );
    }

    #[test]
    fn test_coincident_states_score_weight_sum() {
        let w = SimilarityWeights::default();
        let a = record("A", "forest");
        let b = record("B", "forest");
        // pos_sim = exp(0) = 1, rot_sim = 1
        assert_eq!(
            expected_similarity(&a, &b, &w),
            w.position_weight + w.rotation_weight
        );
    }

    #[test]
    fn test_distance_ten_at_rest_with_orthogonal_quaternions() {
        let w = SimilarityWeights::default();
        let a = record("A", "forest");
        let b = StateRecord::new(
            "B",
            "forest",
            [10.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0; 3],
        );
        // scale = 0.25 / (1 + 0) = 0.25; pos_sim = exp(-2.5); rot_sim = 0
        let expected = 0.6 * (-2.5f64).exp();
        let got = expected_similarity(&a, &b, &w);
        assert!(
            (got - expected).abs() < 1e-12,
            "expected {expected}, got {got}"
        );
    }

    #[test]
    fn test_velocity_relaxes_position_decay() {
        let w = SimilarityWeights::default();
        let slow_a = record("A", "forest");
        let slow_b = StateRecord::new(
            "B",
            "forest",
            [10.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
            [0.0; 3],
        );
        let fast_a = StateRecord::new(
            "A",
            "forest",
            [0.0; 3],
            [1.0, 0.0, 0.0, 0.0],
            [12.0, 0.0, 0.0],
        );
        let fast_b = StateRecord::new(
            "B",
            "forest",
            [10.0, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
            [12.0, 0.0, 0.0],
        );
        let slow = expected_similarity(&slow_a, &slow_b, &w);
        let fast = expected_similarity(&fast_a, &fast_b, &w);
        assert!(
            fast > slow,
            "same separation should score higher at speed: slow={slow}, fast={fast}"
        );
    }

    #[test]
    fn test_position_similarity_strictly_decreases_with_distance() {
        let w = SimilarityWeights::default();
        let a = record("A", "forest");
        let mut prev = f64::INFINITY;
        for dist in [0.0, 1.0, 5.0, 20.0, 100.0] {
            let b = StateRecord::new(
                "B",
                "forest",
                [dist, 0.0, 0.0],
                [1.0, 0.0, 0.0, 0.0],
                [0.0; 3],
            );
            let s = expected_similarity(&a, &b, &w);
            assert!(s < prev, "score should fall as distance grows");
            prev = s;
        }
    }

    #[test]
    fn test_antipodal_quaternions_are_identical_rotations() {
        let w = SimilarityWeights::default();
        let a = record("A", "forest");
        let b = StateRecord::new(
            "B",
            "forest",
            [0.0; 3],
            [-1.0, 0.0, 0.0, 0.0],
            [0.0; 3],
        );
        assert_eq!(expected_similarity(&a, &b, &w), 1.0);
    }

    #[test]
    fn test_unnormalized_quaternions_are_normalized() {
        let w = SimilarityWeights::default();
        let a = StateRecord::new("A", "forest", [0.0; 3], [2.0, 0.0, 0.0, 0.0], [0.0; 3]);
        let b = StateRecord::new("B", "forest", [0.0; 3], [0.5, 0.0, 0.0, 0.0], [0.0; 3]);
        assert_eq!(expected_similarity(&a, &b, &w), 1.0);
    }

    #[test]
    fn test_zero_quaternion_scores_zero_rotation() {
        let w = SimilarityWeights::default();
        let a = StateRecord::new("A", "forest", [0.0; 3], [0.0; 4], [0.0; 3]);
        let b = record("B", "forest");
        // pos_sim = 1, rot channel is the dot against the zero vector
        assert_eq!(expected_similarity(&a, &b, &w), w.position_weight);
    }

    #[test]
    fn test_normalize_quaternion_zero_is_noop() {
        assert_eq!(normalize_quaternion([0.0; 4]), [0.0; 4]);
    }

    #[test]
    fn test_normalize_quaternion_unit_length() {
        let q = normalize_quaternion([1.0, 2.0, -2.0, 4.0]);
        let n = dot4(&q, &q).sqrt();
        assert!((n - 1.0).abs() < 1e-15, "norm should be 1, got {n}");
    }

    #[test]
    fn test_overweighted_channels_can_exceed_one() {
        // Wpos + Wrot > 1 is the caller's business; the score is not clamped.
        let w = SimilarityWeights {
            position_sensitivity: 0.25,
            velocity_tolerance: 0.75,
            position_weight: 0.9,
            rotation_weight: 0.9,
        };
        let a = record("A", "forest");
        let b = record("B", "forest");
        assert!((expected_similarity(&a, &b, &w) - 1.8).abs() < 1e-15);
    }

    #[test]
    fn test_nan_position_propagates() {
        let w = SimilarityWeights::default();
        let a = StateRecord::new(
            "A",
            "forest",
            [f64::NAN, 0.0, 0.0],
            [1.0, 0.0, 0.0, 0.0],
            [0.0; 3],
        );
        let b = record("B", "forest");
        assert!(expected_similarity(&a, &b, &w).is_nan());
    }
}
