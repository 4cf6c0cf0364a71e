//! # NavGuard Standard Library
//!
//! A velocity-command safety filter for mobile robots. Every incoming command
//! is rolled out over a short horizon with a unicycle model, each predicted
//! pose is checked against a collision oracle, and the command is either
//! forwarded untouched or replaced with a full stop.
//!
//! ## Structure
//!
//! ```text
//! navguard_library/
//! ── messages/       # Twist, Pose, JointState, markers, collision snapshots
//! ── tf/             # Rigid transform algebra
//! ── algorithms/     # Twist integration, rollout evaluation, safety gate
//! ── nodes/          # NavCollisionCheckerNode wiring the gate to topics
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use navguard_library::prelude::*;
//!
//! let mut checker = NavCollisionCheckerNode::new(my_oracle)?;
//! let mut scheduler = Scheduler::new();
//! scheduler.add(Box::new(checker), 0, Some(true));
//! scheduler.run()?;
//! ```

pub mod algorithms;
pub mod messages;
pub mod nodes;
pub mod tf;

// Re-export core traits needed for message types
pub use navguard_core::LogSummary;

// Re-export message types at the crate root for convenience
pub use messages::*;

pub use nodes::NavCollisionCheckerNode;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::LogSummary;

    pub use crate::messages::{
        CollisionState, JointState, Marker, MarkerArray, Point3, Pose, Quaternion, Twist, Vector3,
    };

    pub use crate::tf::Transform;

    pub use crate::algorithms::rollout::{
        evaluate, CollisionOracle, RolloutConfig, RolloutStep, SafetyDecision,
    };
    pub use crate::algorithms::safety_gate::{
        GateContext, GateOutcome, GateVerdict, SafetyGate, StateCache,
    };
    pub use crate::algorithms::twist_integration::integrate;

    pub use crate::nodes::NavCollisionCheckerNode;

    pub use navguard_core::{
        Hub, NavGuardError, NavGuardResult, Node, NodeInfo, RuntimeParams, Scheduler,
    };
}
