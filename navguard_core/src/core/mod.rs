//! # Core types and traits for NavGuard
//!
//! - **Node**: The base trait for all computational units
//! - **NodeInfo**: Runtime context handed to nodes while they execute
//!
//! ## Node Lifecycle
//!
//! All nodes follow a consistent lifecycle:
//! 1. **Construction** - Node is created with configuration
//! 2. **Initialization** - `init()` is called to set up resources
//! 3. **Execution** - `tick()` is called repeatedly by the scheduler
//! 4. **Shutdown** - `shutdown()` is called to clean up resources

pub mod node;

pub use node::{LogSummary, Node, NodeInfo, NodeMetrics, NodeState};
