//! Rollout Evaluation
//!
//! Predicts where a velocity command takes the robot over a short horizon and
//! checks every predicted pose against a [`CollisionOracle`].
//!
//! The per-step increment is computed once with
//! [`integrate`](crate::algorithms::twist_integration::integrate) and chained
//! onto the start pose `step_count` times. The first colliding step ends the
//! rollout.
//!
//! # Example
//!
//! ```rust
//! use navguard_library::algorithms::rollout::{evaluate, CollisionOracle, RolloutConfig};
//! use navguard_library::{JointState, Pose, Twist};
//!
//! struct OpenField;
//!
//! impl CollisionOracle for OpenField {
//!     type Environment = String;
//!
//!     fn collides(&mut self, _pose: &Pose, _joints: &JointState) -> anyhow::Result<bool> {
//!         Ok(false)
//!     }
//!
//!     fn update_environment(&mut self, _environment: String) {}
//! }
//!
//! let config = RolloutConfig::new(0.1, 5, false).unwrap();
//! let (decision, steps) = evaluate(
//!     &Pose::origin(),
//!     &Twist::new_2d(0.5, 0.0),
//!     &config,
//!     &JointState::new(),
//!     &mut OpenField,
//! )
//! .unwrap();
//!
//! assert!(!decision.collided);
//! assert_eq!(steps.len(), 5);
//! ```

use crate::algorithms::twist_integration::integrate;
use crate::messages::{JointState, Pose, Twist};
use crate::tf::Transform;
use navguard_core::params::{PASS_THROUGH, ROLL_OUT_STEPS, ROLL_OUT_STEP_TIME};
use navguard_core::{LogSummary, NavGuardError, NavGuardResult, RuntimeParams};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upper bound on the step buffer reserved up front. Longer rollouts grow
/// the buffer only as far as they actually get before a collision.
const MAX_PREALLOCATED_STEPS: usize = 256;

/// Answers whether the robot would collide at a given configuration.
///
/// The geometry engine behind it is opaque; NavGuard only forwards
/// environment updates and asks point queries.
pub trait CollisionOracle {
    /// Environment payload delivered on the environment topic
    type Environment: LogSummary + Send + 'static;

    /// `Ok(true)` when the robot at `pose` with `joints` is in collision
    fn collides(&mut self, pose: &Pose, joints: &JointState) -> anyhow::Result<bool>;

    /// Replace the environment model used by later queries
    fn update_environment(&mut self, environment: Self::Environment);
}

/// Rollout parameters, validated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RolloutConfig {
    step_time: f64,
    step_count: usize,
    pass_through: bool,
}

impl RolloutConfig {
    pub const DEFAULT_STEP_TIME: f64 = 0.1;
    pub const DEFAULT_STEP_COUNT: usize = 10;

    /// `step_time` must be finite and positive
    pub fn new(step_time: f64, step_count: usize, pass_through: bool) -> NavGuardResult<Self> {
        if !step_time.is_finite() || step_time <= 0.0 {
            return Err(NavGuardError::InvalidConfig(format!(
                "{} must be a positive number of seconds, got {}",
                ROLL_OUT_STEP_TIME, step_time
            )));
        }

        Ok(Self {
            step_time,
            step_count,
            pass_through,
        })
    }

    /// Read all three keys from one snapshot of the store.
    ///
    /// Missing keys fall back to the defaults; present but malformed values
    /// are rejected.
    pub fn from_params(params: &RuntimeParams) -> NavGuardResult<Self> {
        let snapshot = params.snapshot()?;

        let step_time = match snapshot.get(ROLL_OUT_STEP_TIME) {
            None => Self::DEFAULT_STEP_TIME,
            Some(value) => value.as_f64().ok_or_else(|| invalid(ROLL_OUT_STEP_TIME, value))?,
        };

        let step_count = match snapshot.get(ROLL_OUT_STEPS) {
            None => Self::DEFAULT_STEP_COUNT,
            Some(value) => value
                .as_u64()
                .and_then(|count| usize::try_from(count).ok())
                .ok_or_else(|| invalid(ROLL_OUT_STEPS, value))?,
        };

        let pass_through = match snapshot.get(PASS_THROUGH) {
            None => false,
            Some(value) => value.as_bool().ok_or_else(|| invalid(PASS_THROUGH, value))?,
        };

        Self::new(step_time, step_count, pass_through)
    }

    pub fn step_time(&self) -> f64 {
        self.step_time
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn pass_through(&self) -> bool {
        self.pass_through
    }

    /// Predicted horizon in seconds
    pub fn horizon(&self) -> f64 {
        self.step_time * self.step_count as f64
    }
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self {
            step_time: Self::DEFAULT_STEP_TIME,
            step_count: Self::DEFAULT_STEP_COUNT,
            pass_through: false,
        }
    }
}

fn invalid(key: &str, value: &Value) -> NavGuardError {
    NavGuardError::InvalidConfig(format!("{} has unusable value {}", key, value))
}

/// One predicted pose of a rollout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RolloutStep {
    pub index: usize,
    pub pose: Pose,
}

/// Outcome of a rollout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SafetyDecision {
    pub collided: bool,
    pub collision_step_index: Option<usize>,
}

impl SafetyDecision {
    pub fn clear() -> Self {
        Self::default()
    }

    pub fn collision_at(index: usize) -> Self {
        Self {
            collided: true,
            collision_step_index: Some(index),
        }
    }
}

/// Roll `twist` out from `start` and stop at the first colliding pose.
///
/// Returns the decision together with every pose that was checked. An oracle
/// failure aborts the rollout.
pub fn evaluate<O>(
    start: &Pose,
    twist: &Twist,
    config: &RolloutConfig,
    joints: &JointState,
    oracle: &mut O,
) -> NavGuardResult<(SafetyDecision, Vec<RolloutStep>)>
where
    O: CollisionOracle + ?Sized,
{
    let delta = integrate(twist, config.step_time());
    let mut cursor = Transform::from(start);
    let mut steps = Vec::with_capacity(config.step_count().min(MAX_PREALLOCATED_STEPS));

    for index in 0..config.step_count() {
        cursor = cursor * delta;
        let pose = cursor.to_pose();
        steps.push(RolloutStep { index, pose });

        if oracle.collides(&pose, joints).map_err(NavGuardError::Oracle)? {
            return Ok((SafetyDecision::collision_at(index), steps));
        }
    }

    Ok((SafetyDecision::clear(), steps))
}
