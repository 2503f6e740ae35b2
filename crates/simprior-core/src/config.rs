//! Similarity scoring hyperparameters.

use serde::{Deserialize, Serialize};

/// Tunable weights of the expected-similarity score.
///
/// The position channel decays exponentially with distance, at a rate that
/// relaxes as the pair's average speed grows: two fast-moving states are
/// allowed to sit further apart than two hovering ones before they stop
/// counting as similar.
///
/// No renormalization is applied when `position_weight + rotation_weight`
/// differs from 1. Callers own the choice of weights; with a sum above 1 the
/// combined score can exceed 1 and is deliberately not clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityWeights {
    /// Wp: sensitivity of the position channel to Euclidean distance.
    pub position_sensitivity: f64,
    /// Wv: how strongly average speed relaxes the distance sensitivity.
    pub velocity_tolerance: f64,
    /// Wpos: weight of the position channel in the combined score.
    pub position_weight: f64,
    /// Wrot: weight of the rotation channel in the combined score.
    pub rotation_weight: f64,
}

impl Default for SimilarityWeights {
    /// The values tuned for the drone telemetry pipeline.
    fn default() -> Self {
        SimilarityWeights {
            position_sensitivity: 0.25,
            velocity_tolerance: 0.75,
            position_weight: 0.6,
            rotation_weight: 0.4,
        }
    }
}
