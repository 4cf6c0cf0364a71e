//! Runtime parameter store for NavGuard
//!
//! A shared key-value store for live-tunable configuration. Handles are cheap
//! to clone and all clones observe the same values (last writer wins).

use crate::error::{NavGuardError, NavGuardResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Default location of the persisted parameter file
pub const DEFAULT_PARAMS_PATH: &str = ".navguard/params.yaml";

/// Key of the rollout integration step in seconds
pub const ROLL_OUT_STEP_TIME: &str = "roll_out_step_time";
/// Key of the number of rollout steps
pub const ROLL_OUT_STEPS: &str = "roll_out_steps";
/// Key of the pass-through switch
pub const PASS_THROUGH: &str = "pass_through";

/// Shared runtime parameter store
pub struct RuntimeParams {
    /// Parameter storage - BTreeMap maintains sorted order
    params: Arc<RwLock<BTreeMap<String, Value>>>,
    /// Bumped on every mutation so readers can detect changes cheaply
    revision: Arc<AtomicU64>,
    /// Optional persistence path
    persist_path: Option<PathBuf>,
}

impl RuntimeParams {
    /// Create the store, loading `.navguard/params.yaml` when it exists
    pub fn init() -> NavGuardResult<Self> {
        let params_file = PathBuf::from(DEFAULT_PARAMS_PATH);
        let store = Self::with_defaults();

        if params_file.exists() {
            store.load_from_disk(&params_file)?;
        }

        Ok(Self {
            persist_path: Some(params_file),
            ..store
        })
    }

    /// Create an in-memory store holding the default values
    pub fn with_defaults() -> Self {
        Self {
            params: Arc::new(RwLock::new(Self::default_values())),
            revision: Arc::new(AtomicU64::new(0)),
            persist_path: None,
        }
    }

    fn default_values() -> BTreeMap<String, Value> {
        let mut values = BTreeMap::new();

        // Rollout defaults
        values.insert(ROLL_OUT_STEP_TIME.to_string(), Value::from(0.1));
        values.insert(ROLL_OUT_STEPS.to_string(), Value::from(10));
        values.insert(PASS_THROUGH.to_string(), Value::from(false));

        // Scheduler defaults
        values.insert("tick_rate".to_string(), Value::from(100));

        values
    }

    /// Get a parameter value
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        let params = self.params.read().ok()?;
        let value = params.get(key)?;
        serde_json::from_value(value.clone()).ok()
    }

    /// Get parameter with default
    pub fn get_or<T: for<'de> Deserialize<'de>>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Get parameter as f64 with default
    pub fn get_f64(&self, key: &str, default: f64) -> f64 {
        self.get_or(key, default)
    }

    /// Get parameter as i64 with default
    pub fn get_i64(&self, key: &str, default: i64) -> i64 {
        self.get_or(key, default)
    }

    /// Get parameter as bool with default
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get_or(key, default)
    }

    /// Set a parameter value
    pub fn set<T: Serialize>(&self, key: &str, value: T) -> NavGuardResult<()> {
        let json_value = serde_json::to_value(value)?;
        let mut params = self.params.write()?;
        params.insert(key.to_string(), json_value);
        self.revision.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    /// Copy of every value taken under a single read lock
    pub fn snapshot(&self) -> NavGuardResult<BTreeMap<String, Value>> {
        let params = self.params.read()?;
        Ok(params.clone())
    }

    /// Monotonic counter bumped by every mutation
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Check if a parameter exists
    pub fn has(&self, key: &str) -> bool {
        self.params
            .read()
            .map(|p| p.contains_key(key))
            .unwrap_or(false)
    }

    /// Remove a parameter
    pub fn remove(&self, key: &str) -> Option<Value> {
        let removed = self.params.write().ok()?.remove(key);
        if removed.is_some() {
            self.revision.fetch_add(1, Ordering::AcqRel);
        }
        removed
    }

    /// Clear all parameters and restore defaults
    pub fn reset(&self) -> NavGuardResult<()> {
        let mut params = self.params.write()?;
        *params = Self::default_values();
        self.revision.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    /// Save parameters to a YAML file
    pub fn save_to_disk(&self) -> NavGuardResult<()> {
        let path = self
            .persist_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PARAMS_PATH));
        self.save_to(&path)
    }

    /// Save parameters to an explicit YAML file
    pub fn save_to(&self, path: &Path) -> NavGuardResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let params = self.params.read()?;
        let yaml = serde_yaml::to_string(&*params)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Merge parameters from a YAML file over the current values
    pub fn load_from_disk(&self, path: &Path) -> NavGuardResult<()> {
        if !path.exists() {
            return Err(NavGuardError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("parameter file {} not found", path.display()),
            )));
        }

        let yaml_str = std::fs::read_to_string(path)?;
        let loaded: BTreeMap<String, Value> = serde_yaml::from_str(&yaml_str)?;

        let mut params = self.params.write()?;
        params.extend(loaded);
        self.revision.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

impl Clone for RuntimeParams {
    fn clone(&self) -> Self {
        Self {
            params: self.params.clone(),
            revision: self.revision.clone(),
            persist_path: self.persist_path.clone(),
        }
    }
}

impl Default for RuntimeParams {
    fn default() -> Self {
        Self::init().unwrap_or_else(|e| {
            tracing::warn!("Failed to load runtime parameters: {}. Using defaults.", e);
            Self::with_defaults()
        })
    }
}
