//! Error types shared by every NavGuard crate

use std::sync::PoisonError;
use thiserror::Error;

/// Result alias used across NavGuard
pub type NavGuardResult<T> = Result<T, NavGuardError>;

/// Errors raised by the NavGuard runtime and the collision filter
#[derive(Debug, Error)]
pub enum NavGuardError {
    /// A configuration value was rejected at the configuration boundary
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The collision oracle could not produce a verdict
    #[error("collision oracle failed: {0}")]
    Oracle(#[source] anyhow::Error),

    /// A topic was opened with a different message type than its first user
    #[error("topic '{topic}' already carries {existing}, cannot open it as {requested}")]
    TopicTypeMismatch {
        topic: String,
        existing: &'static str,
        requested: &'static str,
    },

    #[error("node '{0}' not found")]
    NodeNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl NavGuardError {
    /// Wrap any oracle-side failure
    pub fn oracle<E>(error: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        NavGuardError::Oracle(error.into())
    }
}

impl<T> From<PoisonError<T>> for NavGuardError {
    fn from(err: PoisonError<T>) -> Self {
        NavGuardError::LockPoisoned(err.to_string())
    }
}
