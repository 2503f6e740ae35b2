use serde::{Deserialize, Serialize};

/// One captured drone state from the privileged telemetry log.
///
/// The telemetry table also carries angular velocity and a collision flag;
/// neither feeds the similarity score, so they are not represented here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    /// Unique identifier within a batch. Matrix rows/columns are labeled by
    /// this id, and a pair with equal ids is maximally similar by rule.
    pub anchor_id: String,
    /// Simulation environment the state was captured in. States from
    /// different environments are non-comparable.
    pub env_name: String,
    /// World position (x, y, z), meters.
    pub position: [f64; 3],
    /// Orientation quaternion (w, x, y, z). Not guaranteed normalized;
    /// the metric normalizes it and tolerates the zero quaternion.
    pub orientation: [f64; 4],
    /// Linear velocity (vx, vy, vz), meters/second.
    pub linear_velocity: [f64; 3],
}

impl StateRecord {
    pub fn new(
        anchor_id: impl Into<String>,
        env_name: impl Into<String>,
        position: [f64; 3],
        orientation: [f64; 4],
        linear_velocity: [f64; 3],
    ) -> Self {
        StateRecord {
            anchor_id: anchor_id.into(),
            env_name: env_name.into(),
            position,
            orientation,
            linear_velocity,
        }
    }

    /// Velocity magnitude (Euclidean norm of `linear_velocity`).
    pub fn speed(&self) -> f64 {
        crate::metric::norm3(&self.linear_velocity)
    }
}
