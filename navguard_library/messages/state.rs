//! Robot articulation state

use navguard_core::LogSummary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named joint positions describing the robot's articulated configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JointState {
    positions: BTreeMap<String, f64>,
    /// Timestamp in nanoseconds since epoch
    pub timestamp: u64,
}

impl JointState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, position)` pairs; later duplicates win
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            positions: pairs
                .into_iter()
                .map(|(name, position)| (name.into(), position))
                .collect(),
            timestamp: 0,
        }
    }

    pub fn set(&mut self, name: impl Into<String>, position: f64) {
        self.positions.insert(name.into(), position);
    }

    pub fn position(&self, name: &str) -> Option<f64> {
        self.positions.get(name).copied()
    }

    /// Overwrite the joints named in `update`, keeping every other joint
    pub fn merge(&mut self, update: &JointState) {
        for (name, position) in &update.positions {
            self.positions.insert(name.clone(), *position);
        }
        self.timestamp = self.timestamp.max(update.timestamp);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.positions.iter().map(|(name, pos)| (name.as_str(), *pos))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl LogSummary for JointState {
    fn log_summary(&self) -> String {
        format!("JointState({} joints)", self.positions.len())
    }
}
