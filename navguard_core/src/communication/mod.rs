//! # Communication layer for NavGuard
//!
//! - **Hub**: named in-process topic shared by every handle opened with the same name
//!
//! ```rust
//! use navguard_core::communication::Hub;
//! let hub: Hub<String> = Hub::new("doc_topic").unwrap();
//! let _ = hub.send("ping".to_string(), None);
//! assert_eq!(hub.recv(None), Some("ping".to_string()));
//! ```

pub mod hub;

pub use hub::{Hub, HubMetrics};
