//! Pose algebra
//!
//! Rigid-body transforms used to chain rollout increments onto a start pose.
//! Frame trees and buffering are handled outside NavGuard; this module only
//! does the math.
//!
//! # Example
//!
//! ```rust,ignore
//! use navguard_library::tf::Transform;
//!
//! let start = Transform::from_planar(1.0, 0.0, 0.0);
//! let step = Transform::from_translation([0.5, 0.0, 0.0]);
//! let next = start * step;
//! assert_eq!(next.translation(), [1.5, 0.0, 0.0]);
//! ```

mod transform;

pub use transform::Transform;

/// Get current timestamp in nanoseconds
pub fn timestamp_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
