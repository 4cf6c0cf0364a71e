//! Diagnostic messages emitted by the collision filter

use crate::messages::geometry::Pose;
use crate::messages::state::JointState;
use navguard_core::LogSummary;
use serde::{Deserialize, Serialize};

/// Snapshot of the robot configuration that was found in collision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionState {
    /// Predicted pose that collided
    pub pose: Pose,
    /// Joint configuration used for the query
    pub joints: JointState,
    /// Rollout step at which the collision was found
    pub step_index: usize,
    /// Timestamp in nanoseconds since epoch
    pub timestamp: u64,
}

impl CollisionState {
    pub fn new(pose: Pose, joints: JointState, step_index: usize) -> Self {
        Self {
            pose,
            joints,
            step_index,
            timestamp: crate::tf::timestamp_now(),
        }
    }
}

impl LogSummary for CollisionState {
    fn log_summary(&self) -> String {
        format!(
            "CollisionState(step={}, {})",
            self.step_index,
            self.pose.log_summary()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_state_creation() {
        let state = CollisionState::new(Pose::from_xy_yaw(1.0, 0.0, 0.0), JointState::new(), 3);
        assert_eq!(state.step_index, 3);
        assert!(state.timestamp > 0);
        assert!(state.log_summary().starts_with("CollisionState(step=3"));
    }
}
