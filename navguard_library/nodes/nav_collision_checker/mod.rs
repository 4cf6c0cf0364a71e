//! Navigation collision checker node
//!
//! Sits between a velocity command source and the motor controller. Every raw
//! command is rolled out from the latest robot pose and forwarded either
//! unchanged or as a full stop.
//!
//! Topics (defaults):
//!
//! | direction | topic                          | type                  |
//! |-----------|--------------------------------|-----------------------|
//! | in        | `octomap`                      | `O::Environment`      |
//! | in        | `robot_pose`                   | [`Pose`]              |
//! | in        | `joint_states`                 | [`JointState`]        |
//! | in        | `cmd_vel_raw`                  | [`Twist`]             |
//! | out       | `cmd_vel_safe`                 | [`Twist`]             |
//! | out       | `nav_collision_check_markers`  | [`MarkerArray`]       |
//! | out       | `in_collision_state` (opt-in)  | [`CollisionState`]    |

mod markers;

pub use markers::TrajectoryMarkers;

use crate::algorithms::rollout::{CollisionOracle, RolloutConfig};
use crate::algorithms::safety_gate::{
    GateContext, GateOutcome, GateStats, GateVerdict, SafetyGate, StateCache,
};
use crate::messages::{CollisionState, JointState, MarkerArray, Pose, Twist};
use navguard_core::{Hub, NavGuardResult, Node, NodeInfo, RuntimeParams};
use std::time::{Duration, Instant};

const NODE_NAME: &str = "NavCollisionCheckerNode";

/// Warning period while no pose has been received
const MISSING_POSE_WARN_PERIOD: Duration = Duration::from_secs(3);
const MISSING_POSE_WARNING: &str =
    "No robot pose received yet, forwarding velocity commands unchecked";
/// Info period for repeated collision reports
const COLLISION_INFO_PERIOD: Duration = Duration::from_secs(1);
/// Output topics keep only the newest message: a late stop must replace a queued go
const OUTPUT_QUEUE_DEPTH: usize = 1;

/// Topic names used by [`NavCollisionCheckerNode`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavCollisionCheckerTopics {
    pub environment: String,
    pub robot_pose: String,
    pub joint_states: String,
    pub cmd_vel_raw: String,
    pub cmd_vel_safe: String,
    pub markers: String,
}

impl Default for NavCollisionCheckerTopics {
    fn default() -> Self {
        Self {
            environment: "octomap".to_string(),
            robot_pose: "robot_pose".to_string(),
            joint_states: "joint_states".to_string(),
            cmd_vel_raw: "cmd_vel_raw".to_string(),
            cmd_vel_safe: "cmd_vel_safe".to_string(),
            markers: "nav_collision_check_markers".to_string(),
        }
    }
}

impl NavCollisionCheckerTopics {
    /// Default topic names under a common prefix, e.g. `robot1/cmd_vel_raw`
    pub fn with_prefix(prefix: &str) -> Self {
        let base = Self::default();
        let scoped = |name: &str| format!("{}/{}", prefix.trim_end_matches('/'), name);
        Self {
            environment: scoped(&base.environment),
            robot_pose: scoped(&base.robot_pose),
            joint_states: scoped(&base.joint_states),
            cmd_vel_raw: scoped(&base.cmd_vel_raw),
            cmd_vel_safe: scoped(&base.cmd_vel_safe),
            markers: scoped(&base.markers),
        }
    }
}

/// Navigation Collision Checker Node - stop-or-go velocity filter
///
/// Generic over the collision oracle so any geometry engine can be plugged in.
/// Configuration is read from [`RuntimeParams`] (`roll_out_step_time`,
/// `roll_out_steps`, `pass_through`) whenever the store changes.
pub struct NavCollisionCheckerNode<O: CollisionOracle> {
    oracle: O,

    environment_subscriber: Hub<O::Environment>,
    pose_subscriber: Hub<Pose>,
    joint_subscriber: Hub<JointState>,
    command_subscriber: Hub<Twist>,

    command_publisher: Hub<Twist>,
    marker_publisher: Hub<MarkerArray>,
    collision_state_publisher: Option<Hub<CollisionState>>,

    params: Option<RuntimeParams>,
    config: RolloutConfig,
    config_revision: Option<u64>,

    state: StateCache,
    gate: SafetyGate,
    markers: TrajectoryMarkers,

    // Throttle for the missing-pose warning when no NodeInfo is supplied
    last_missing_pose_warning: Option<Instant>,
}

impl<O> NavCollisionCheckerNode<O>
where
    O: CollisionOracle + Send + 'static,
{
    /// Create the node on the default topics
    pub fn new(oracle: O) -> NavGuardResult<Self> {
        Self::new_with_topics(oracle, NavCollisionCheckerTopics::default())
    }

    /// Create the node on custom topics
    pub fn new_with_topics(oracle: O, topics: NavCollisionCheckerTopics) -> NavGuardResult<Self> {
        Ok(Self {
            oracle,

            environment_subscriber: Hub::new(&topics.environment)?,
            pose_subscriber: Hub::new(&topics.robot_pose)?,
            joint_subscriber: Hub::new(&topics.joint_states)?,
            command_subscriber: Hub::new(&topics.cmd_vel_raw)?,

            command_publisher: Hub::new_with_capacity(&topics.cmd_vel_safe, OUTPUT_QUEUE_DEPTH)?,
            marker_publisher: Hub::new_with_capacity(&topics.markers, OUTPUT_QUEUE_DEPTH)?,
            collision_state_publisher: None,

            params: None,
            config: RolloutConfig::default(),
            config_revision: None,

            state: StateCache::new(),
            gate: SafetyGate::new(),
            markers: TrajectoryMarkers::default(),

            last_missing_pose_warning: None,
        })
    }

    /// Read configuration from `params` instead of the scheduler's store
    pub fn with_params(mut self, params: RuntimeParams) -> Self {
        self.params = Some(params);
        self.config_revision = None;
        self
    }

    /// Publish a [`CollisionState`] snapshot on `topic` whenever a stop is issued
    pub fn with_collision_state_topic(mut self, topic: &str) -> NavGuardResult<Self> {
        self.collision_state_publisher = Some(Hub::new(topic)?);
        Ok(self)
    }

    /// Replace the marker styling
    pub fn set_markers(&mut self, markers: TrajectoryMarkers) {
        self.markers = markers;
    }

    /// Configuration used for the next command
    pub fn config(&self) -> &RolloutConfig {
        &self.config
    }

    pub fn state(&self) -> &StateCache {
        &self.state
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn gate_stats(&self) -> GateStats {
        self.gate.stats()
    }

    /// Forward a new environment model to the oracle
    pub fn handle_environment(&mut self, environment: O::Environment, ctx: Option<&mut NodeInfo>) {
        let started = Instant::now();
        self.oracle.update_environment(environment);

        if let Some(ctx) = ctx {
            ctx.log_debug(&format!(
                "Environment update took {:.3} ms",
                started.elapsed().as_secs_f64() * 1000.0
            ));
        }
    }

    pub fn handle_pose(&mut self, pose: Pose) {
        self.state.update_pose(pose);
    }

    pub fn handle_joint_state(&mut self, joints: &JointState) {
        self.state.update_joint_state(joints);
    }

    /// Filter one raw command and publish the result.
    ///
    /// On an oracle failure nothing is published and the error is returned.
    pub fn handle_velocity_command(
        &mut self,
        command: Twist,
        mut ctx: Option<&mut NodeInfo>,
    ) -> NavGuardResult<GateOutcome> {
        self.refresh_config(ctx.as_deref_mut());

        let context = GateContext::new(&self.config, &self.state);
        let outcome = self.gate.filter(&context, &command, &mut self.oracle)?;

        match outcome.verdict {
            GateVerdict::MissingPose => match ctx.as_deref_mut() {
                Some(ctx) => {
                    ctx.log_warning_throttled(
                        "missing_pose",
                        MISSING_POSE_WARN_PERIOD,
                        MISSING_POSE_WARNING,
                    );
                }
                None => {
                    self.warn_missing_pose_without_context(Instant::now());
                }
            },
            GateVerdict::Collision { step_index } => {
                if let Some(ctx) = ctx.as_deref_mut() {
                    ctx.log_info_throttled(
                        "collision",
                        COLLISION_INFO_PERIOD,
                        &format!(
                            "Predicted collision at rollout step {} of {}, stopping robot",
                            step_index,
                            self.config.step_count()
                        ),
                    );
                }
                self.publish_collision_state(&outcome, step_index, ctx.as_deref_mut());
            }
            GateVerdict::PassThrough | GateVerdict::Clear => {}
        }

        if self
            .command_publisher
            .send_latest(outcome.output, ctx.as_deref_mut())
            .is_err()
        {
            if let Some(ctx) = ctx.as_deref_mut() {
                ctx.log_warning("Filtered command could not be published");
            }
        }

        if !outcome.steps.is_empty() {
            let markers = self.markers.build(&outcome.steps);
            if self
                .marker_publisher
                .send_latest(markers, ctx.as_deref_mut())
                .is_err()
            {
                if let Some(ctx) = ctx.as_deref_mut() {
                    ctx.log_debug("Rollout markers could not be published");
                }
            }
        }

        Ok(outcome)
    }

    /// Returns `true` when the warning was emitted
    fn warn_missing_pose_without_context(&mut self, now: Instant) -> bool {
        let due = self
            .last_missing_pose_warning
            .map_or(true, |last| now.duration_since(last) >= MISSING_POSE_WARN_PERIOD);
        if due {
            self.last_missing_pose_warning = Some(now);
            tracing::warn!(node = NODE_NAME, "{}", MISSING_POSE_WARNING);
        }
        due
    }

    fn publish_collision_state(
        &self,
        outcome: &GateOutcome,
        step_index: usize,
        ctx: Option<&mut NodeInfo>,
    ) {
        let (Some(publisher), Some(pose)) =
            (&self.collision_state_publisher, outcome.collision_pose())
        else {
            return;
        };

        let snapshot = CollisionState::new(*pose, self.state.joint_state().clone(), step_index);
        let _ = publisher.send_latest(snapshot, ctx);
    }

    /// Re-read the rollout configuration when the parameter store changed.
    /// Invalid values are rejected and the previous configuration stays active.
    fn refresh_config(&mut self, ctx: Option<&mut NodeInfo>) {
        let Some(params) = &self.params else {
            return;
        };

        let revision = params.revision();
        if self.config_revision == Some(revision) {
            return;
        }
        self.config_revision = Some(revision);

        match RolloutConfig::from_params(params) {
            Ok(config) => {
                if config != self.config {
                    if let Some(ctx) = ctx {
                        ctx.log_info(&format!(
                            "Rollout configuration: {} steps of {:.3} s, pass_through={}",
                            config.step_count(),
                            config.step_time(),
                            config.pass_through()
                        ));
                    }
                }
                self.config = config;
            }
            Err(e) => {
                if let Some(ctx) = ctx {
                    ctx.log_warning(&format!("Keeping previous rollout configuration: {}", e));
                }
            }
        }
    }
}

impl<O> Node for NavCollisionCheckerNode<O>
where
    O: CollisionOracle + Send + 'static,
{
    fn name(&self) -> &'static str {
        NODE_NAME
    }

    fn init(&mut self, ctx: &mut NodeInfo) -> NavGuardResult<()> {
        if self.params.is_none() {
            self.params = Some(ctx.params.clone());
        }
        self.refresh_config(Some(&mut *ctx));
        ctx.log_info("Navigation collision checker ready");
        Ok(())
    }

    fn tick(&mut self, mut ctx: Option<&mut NodeInfo>) {
        while let Some(environment) = self.environment_subscriber.recv(ctx.as_deref_mut()) {
            self.handle_environment(environment, ctx.as_deref_mut());
        }

        while let Some(pose) = self.pose_subscriber.recv(ctx.as_deref_mut()) {
            self.handle_pose(pose);
        }

        while let Some(joints) = self.joint_subscriber.recv(ctx.as_deref_mut()) {
            self.handle_joint_state(&joints);
        }

        let mut tick_failed = false;
        while let Some(command) = self.command_subscriber.recv(ctx.as_deref_mut()) {
            if let Err(e) = self.handle_velocity_command(command, ctx.as_deref_mut()) {
                let message = format!("Velocity command not forwarded: {}", e);
                if let Some(ctx) = ctx.as_deref_mut() {
                    if tick_failed {
                        ctx.log_error(&message);
                    } else {
                        ctx.record_tick_failure(message);
                    }
                } else {
                    tracing::error!("{}", message);
                }
                tick_failed = true;
            }
        }
    }

    fn shutdown(&mut self, ctx: &mut NodeInfo) -> NavGuardResult<()> {
        let stats = self.gate.stats();
        ctx.log_info(&format!(
            "Collision checker stopping: {} clear, {} stopped, {} fail-open, {} passed through",
            stats.clear, stats.stopped, stats.fail_open, stats.passed_through
        ));
        Ok(())
    }
}
