//! NavGuard nodes
//!
//! Nodes wire the pure algorithms to topics. Each follows the same pattern:
//! `NodeName::new(...)` for the default topics or `NodeName::new_with_topics(...)`
//! for custom ones.
//!
//! - `NavCollisionCheckerNode` - stop-or-go velocity filter backed by a collision oracle

pub mod nav_collision_checker;

pub use nav_collision_checker::{NavCollisionCheckerNode, NavCollisionCheckerTopics, TrajectoryMarkers};
