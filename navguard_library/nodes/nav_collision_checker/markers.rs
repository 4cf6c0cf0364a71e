//! Rollout visualization

use crate::algorithms::rollout::RolloutStep;
use crate::messages::{Marker, MarkerArray, MarkerColor, MarkerType, Vector3};

/// Builds one arrow marker per rollout step
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryMarkers {
    pub namespace: String,
    pub frame_id: String,
    pub color: MarkerColor,
    /// Arrow length, width and height (m)
    pub scale: Vector3,
}

impl Default for TrajectoryMarkers {
    fn default() -> Self {
        Self {
            namespace: "nav_coll_check".to_string(),
            frame_id: "world".to_string(),
            color: MarkerColor::blue(),
            scale: Vector3::new(0.1, 0.025, 0.025),
        }
    }
}

impl TrajectoryMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh marker set for `steps`; marker ids equal step indices, saturating at `u32::MAX`
    pub fn build(&self, steps: &[RolloutStep]) -> MarkerArray {
        MarkerArray {
            markers: steps
                .iter()
                .map(|step| Marker {
                    ns: self.namespace.clone(),
                    id: u32::try_from(step.index).unwrap_or(u32::MAX),
                    frame_id: self.frame_id.clone(),
                    marker_type: MarkerType::Arrow,
                    pose: step.pose,
                    scale: self.scale,
                    color: self.color,
                })
                .collect(),
        }
    }
}
