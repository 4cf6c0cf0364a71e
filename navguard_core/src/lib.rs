//! # NavGuard Core
//!
//! The runtime layer the NavGuard collision filter is built on.
//!
//! This crate provides the small set of building blocks a reactive filter node
//! needs:
//!
//! - **Nodes**: Independent computational units that process data
//! - **Communication**: In-process publisher-subscriber topics between nodes
//! - **Parameters**: A live-tunable key/value configuration store
//! - **Scheduling**: A single-threaded dispatcher that ticks nodes one at a time
//!
//! ## Quick Start
//!
//! ```rust
//! use navguard_core::{Hub, Node, NodeInfo};
//!
//! struct ExampleNode {
//!     output: Hub<String>,
//! }
//!
//! impl Node for ExampleNode {
//!     fn name(&self) -> &'static str { "example" }
//!
//!     fn tick(&mut self, mut ctx: Option<&mut NodeInfo>) {
//!         let _ = self.output.send("Hello NavGuard!".into(), ctx.as_deref_mut());
//!     }
//! }
//! ```

pub mod communication;
pub mod core;
pub mod error;
pub mod logging;
pub mod params;
pub mod scheduling;

// Re-export commonly used types for easy access
pub use communication::Hub;
pub use core::{LogSummary, Node, NodeInfo, NodeMetrics, NodeState};
pub use error::{NavGuardError, NavGuardResult};
pub use params::RuntimeParams;
pub use scheduling::Scheduler;
