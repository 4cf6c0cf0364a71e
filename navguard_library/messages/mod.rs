//! Message types exchanged by NavGuard nodes
//!
//! - Geometry: spatial primitives (Twist, Pose, Quaternion, ...)
//! - State: robot joint configuration
//! - Visualization: markers describing a rollout
//! - Diagnostics: colliding-configuration snapshots
//!
//! All message types are re-exported at the crate root for convenience.

pub mod diagnostics;
pub mod geometry;
pub mod state;
pub mod visualization;

pub use diagnostics::CollisionState;
pub use geometry::{Point3, Pose, Quaternion, Twist, Vector3};
pub use state::JointState;
pub use visualization::{Marker, MarkerArray, MarkerColor, MarkerType};
