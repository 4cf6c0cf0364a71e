//! Visualization message types
//!
//! Display-only descriptions of geometry for an external viewer. Nothing in
//! NavGuard renders these; they are published for whoever listens.

use crate::messages::geometry::{Pose, Vector3};
use navguard_core::LogSummary;
use serde::{Deserialize, Serialize};

/// Shape drawn for a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerType {
    Arrow,
}

/// RGBA color with components in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkerColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl MarkerColor {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    pub fn blue() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }
}

/// A single displayable shape placed at a pose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Namespace grouping related markers
    pub ns: String,
    /// Identifier, unique within the namespace
    pub id: u32,
    /// Frame the pose is expressed in
    pub frame_id: String,
    pub marker_type: MarkerType,
    pub pose: Pose,
    pub scale: Vector3,
    pub color: MarkerColor,
}

/// Ordered list of markers published as one message
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkerArray {
    pub markers: Vec<Marker>,
}

impl MarkerArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

impl LogSummary for MarkerArray {
    fn log_summary(&self) -> String {
        format!("MarkerArray({} markers)", self.markers.len())
    }
}
