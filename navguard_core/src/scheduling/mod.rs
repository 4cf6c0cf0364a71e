//! # Scheduling
//!
//! The scheduler is the single logical dispatcher: nodes are ticked one at a
//! time, in priority order, on the calling thread. A node's tick always runs to
//! completion before the next node starts, so node state needs no locking.

pub mod scheduler;

pub use scheduler::Scheduler;
