//! Pure computational algorithms behind the collision filter
//!
//! Nothing in here touches topics or logging; nodes own the I/O and call into
//! these functions with plain values.
//!
//! # Available Algorithms
//!
//! - **twist_integration**: one-step unicycle motion increment for a velocity command
//! - **rollout**: chains increments from a start pose and queries a collision oracle per step
//! - **safety_gate**: pass-through / fail-open / stop policy around a rollout

pub mod rollout;
pub mod safety_gate;
pub mod twist_integration;
