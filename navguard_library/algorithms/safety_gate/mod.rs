//! Safety Gate
//!
//! Stop-or-go policy wrapped around a rollout. Given the cached robot state and
//! a configuration snapshot, a command is handled as follows, in this order:
//!
//! 1. pass-through enabled: forwarded unchanged, nothing evaluated
//! 2. no robot pose known yet: forwarded unchanged (fail-open)
//! 3. otherwise rolled out; a predicted collision replaces it with a full stop
//!
//! Fail-open on a missing pose means commands reach the motors unchecked until
//! the first pose arrives. Callers are expected to surface that loudly.
//!
//! # Example
//!
//! ```rust,ignore
//! use navguard_library::algorithms::safety_gate::{GateContext, SafetyGate, StateCache};
//!
//! let mut cache = StateCache::new();
//! cache.update_pose(current_pose);
//!
//! let mut gate = SafetyGate::new();
//! let outcome = gate.filter(&GateContext::new(&config, &cache), &command, &mut oracle)?;
//! motor_cmd.send(outcome.output, None)?;
//! ```

use crate::algorithms::rollout::{
    evaluate, CollisionOracle, RolloutConfig, RolloutStep, SafetyDecision,
};
use crate::messages::{JointState, Pose, Twist};
use navguard_core::NavGuardResult;

/// Latest robot state seen on the input topics
#[derive(Debug, Clone, Default)]
pub struct StateCache {
    robot_pose: Option<Pose>,
    joint_state: JointState,
}

impl StateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the known pose (last writer wins)
    pub fn update_pose(&mut self, pose: Pose) {
        self.robot_pose = Some(pose);
    }

    /// Merge by joint name; joints absent from `update` keep their value
    pub fn update_joint_state(&mut self, update: &JointState) {
        self.joint_state.merge(update);
    }

    pub fn robot_pose(&self) -> Option<&Pose> {
        self.robot_pose.as_ref()
    }

    pub fn joint_state(&self) -> &JointState {
        &self.joint_state
    }
}

/// Read-only inputs of one gate decision
#[derive(Debug, Clone, Copy)]
pub struct GateContext<'a> {
    pub config: &'a RolloutConfig,
    pub state: &'a StateCache,
}

impl<'a> GateContext<'a> {
    pub fn new(config: &'a RolloutConfig, state: &'a StateCache) -> Self {
        Self { config, state }
    }
}

/// Why the gate produced its output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    /// Filtering disabled by configuration
    PassThrough,
    /// No pose known, command forwarded unchecked
    MissingPose,
    /// Rollout found no collision
    Clear,
    /// Rollout collided at `step_index`, command replaced by a stop
    Collision { step_index: usize },
}

/// Result of filtering one command
#[derive(Debug, Clone, PartialEq)]
pub struct GateOutcome {
    /// Command to forward to the motors
    pub output: Twist,
    /// Poses that were checked, for visualization
    pub steps: Vec<RolloutStep>,
    pub verdict: GateVerdict,
}

impl GateOutcome {
    /// True when the input command was replaced by a stop
    pub fn is_stop(&self) -> bool {
        matches!(self.verdict, GateVerdict::Collision { .. })
    }

    /// Pose at which the rollout collided
    pub fn collision_pose(&self) -> Option<&Pose> {
        match self.verdict {
            GateVerdict::Collision { step_index } => self
                .steps
                .iter()
                .find(|step| step.index == step_index)
                .map(|step| &step.pose),
            _ => None,
        }
    }
}

/// Running totals of gate decisions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateStats {
    pub passed_through: u64,
    pub fail_open: u64,
    pub clear: u64,
    pub stopped: u64,
}

/// Collision-gated velocity filter
#[derive(Debug, Default)]
pub struct SafetyGate {
    stats: GateStats,
}

impl SafetyGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide what to forward for `input`. Oracle failures are returned unchanged.
    pub fn filter<O>(
        &mut self,
        context: &GateContext<'_>,
        input: &Twist,
        oracle: &mut O,
    ) -> NavGuardResult<GateOutcome>
    where
        O: CollisionOracle + ?Sized,
    {
        if context.config.pass_through() {
            self.stats.passed_through += 1;
            return Ok(GateOutcome {
                output: *input,
                steps: Vec::new(),
                verdict: GateVerdict::PassThrough,
            });
        }

        let Some(start) = context.state.robot_pose() else {
            self.stats.fail_open += 1;
            return Ok(GateOutcome {
                output: *input,
                steps: Vec::new(),
                verdict: GateVerdict::MissingPose,
            });
        };

        let (decision, steps) = evaluate(
            start,
            input,
            context.config,
            context.state.joint_state(),
            oracle,
        )?;

        Ok(self.resolve(decision, steps, input))
    }

    /// Map a rollout decision to the command to forward. `collided` alone
    /// decides; a missing step index falls back to the last evaluated step.
    fn resolve(
        &mut self,
        decision: SafetyDecision,
        steps: Vec<RolloutStep>,
        input: &Twist,
    ) -> GateOutcome {
        if decision.collided {
            let step_index = decision
                .collision_step_index
                .or_else(|| steps.last().map(|step| step.index))
                .unwrap_or(0);
            self.stats.stopped += 1;
            return GateOutcome {
                output: Twist::zero(),
                steps,
                verdict: GateVerdict::Collision { step_index },
            };
        }

        self.stats.clear += 1;
        GateOutcome {
            output: *input,
            steps,
            verdict: GateVerdict::Clear,
        }
    }

    pub fn stats(&self) -> GateStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = GateStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::rollout::tests::ScriptedOracle;
    use navguard_core::NavGuardError;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn cache_at_origin() -> StateCache {
        let mut cache = StateCache::new();
        cache.update_pose(Pose::origin());
        cache
    }

    #[test]
    fn test_pass_through_forwards_unchanged() {
        let config = RolloutConfig::new(0.1, 5, true).unwrap();
        let cache = cache_at_origin();
        let mut oracle = ScriptedOracle::colliding_at(0);
        let mut gate = SafetyGate::new();
        let input = Twist::new_2d(0.5, 0.1);

        let outcome = gate
            .filter(&GateContext::new(&config, &cache), &input, &mut oracle)
            .unwrap();

        assert_eq!(outcome.output, input);
        assert!(outcome.steps.is_empty());
        assert_eq!(outcome.verdict, GateVerdict::PassThrough);
        assert!(oracle.queries.is_empty());
    }

    #[test]
    fn test_missing_pose_fails_open() {
        let config = RolloutConfig::new(0.1, 5, false).unwrap();
        let cache = StateCache::new();
        let mut oracle = ScriptedOracle::colliding_at(0);
        let mut gate = SafetyGate::new();
        let input = Twist::new_2d(1.0, 0.0);

        let outcome = gate
            .filter(&GateContext::new(&config, &cache), &input, &mut oracle)
            .unwrap();

        assert_eq!(outcome.output, input);
        assert!(outcome.steps.is_empty());
        assert_eq!(outcome.verdict, GateVerdict::MissingPose);
        assert!(oracle.queries.is_empty());
        assert_eq!(gate.stats().fail_open, 1);
    }

    #[test]
    fn test_collision_stops_robot() {
        let config = RolloutConfig::new(0.1, 5, false).unwrap();
        let cache = cache_at_origin();
        let mut oracle = ScriptedOracle::colliding_at(2);
        let mut gate = SafetyGate::new();
        let input = Twist::new([0.5, 0.1, 0.0], [0.0, 0.0, 0.2]);

        let outcome = gate
            .filter(&GateContext::new(&config, &cache), &input, &mut oracle)
            .unwrap();

        assert!(outcome.output.is_zero());
        assert_eq!(outcome.steps.len(), 3);
        assert_eq!(outcome.verdict, GateVerdict::Collision { step_index: 2 });
        assert!(outcome.is_stop());
        assert_eq!(outcome.collision_pose(), Some(&outcome.steps[2].pose));
        assert_eq!(gate.stats().stopped, 1);
    }

    #[test]
    fn test_collided_without_index_still_stops() {
        let mut gate = SafetyGate::new();
        let steps = vec![
            RolloutStep {
                index: 0,
                pose: Pose::origin(),
            },
            RolloutStep {
                index: 1,
                pose: Pose::from_xy_yaw(0.1, 0.0, 0.0),
            },
        ];
        let decision = SafetyDecision {
            collided: true,
            collision_step_index: None,
        };

        let outcome = gate.resolve(decision, steps, &Twist::new_2d(1.0, 0.0));

        assert!(outcome.output.is_zero());
        assert_eq!(outcome.verdict, GateVerdict::Collision { step_index: 1 });
        assert_eq!(gate.stats().stopped, 1);
        assert_eq!(gate.stats().clear, 0);
    }

    #[test]
    fn test_clear_rollout_forwards_input() {
        let config = RolloutConfig::new(0.1, 5, false).unwrap();
        let cache = cache_at_origin();
        let mut oracle = ScriptedOracle::never();
        let mut gate = SafetyGate::new();
        let input = Twist::new_2d(0.5, 0.0);

        let outcome = gate
            .filter(&GateContext::new(&config, &cache), &input, &mut oracle)
            .unwrap();

        assert_eq!(outcome.output, input);
        assert_eq!(outcome.steps.len(), 5);
        assert_eq!(outcome.verdict, GateVerdict::Clear);
        assert_eq!(outcome.collision_pose(), None);
    }

    #[test]
    fn test_zero_steps_forwards_input() {
        let config = RolloutConfig::new(0.1, 0, false).unwrap();
        let cache = cache_at_origin();
        let mut oracle = ScriptedOracle::colliding_at(0);
        let mut gate = SafetyGate::new();
        let input = Twist::new_2d(0.5, 0.0);

        let outcome = gate
            .filter(&GateContext::new(&config, &cache), &input, &mut oracle)
            .unwrap();

        assert_eq!(outcome.output, input);
        assert!(outcome.steps.is_empty());
        assert_eq!(outcome.verdict, GateVerdict::Clear);
    }

    #[test]
    fn test_oracle_failure_is_returned() {
        let config = RolloutConfig::default();
        let cache = cache_at_origin();
        let mut oracle = ScriptedOracle::failing_at(0);
        let mut gate = SafetyGate::new();

        let result = gate.filter(
            &GateContext::new(&config, &cache),
            &Twist::new_2d(0.5, 0.0),
            &mut oracle,
        );

        assert!(matches!(result, Err(NavGuardError::Oracle(_))));
        assert_eq!(gate.stats(), GateStats::default());
    }

    #[test]
    fn test_pass_through_holds_for_random_inputs() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = RolloutConfig::new(0.1, 10, true).unwrap();
        let mut gate = SafetyGate::new();

        for _ in 0..200 {
            let input = Twist::new(
                [rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0), 0.0],
                [0.0, 0.0, rng.gen_range(-3.0..3.0)],
            );
            let mut cache = StateCache::new();
            if rng.gen_bool(0.5) {
                cache.update_pose(Pose::from_xy_yaw(
                    rng.gen_range(-5.0..5.0),
                    rng.gen_range(-5.0..5.0),
                    rng.gen_range(-3.0..3.0),
                ));
            }
            let mut oracle = ScriptedOracle {
                collide_at: (0..10).collect(),
                ..ScriptedOracle::default()
            };

            let outcome = gate
                .filter(&GateContext::new(&config, &cache), &input, &mut oracle)
                .unwrap();
            assert_eq!(outcome.output, input);
        }

        assert_eq!(gate.stats().passed_through, 200);
    }

    #[test]
    fn test_state_cache_merges_joints() {
        let mut cache = StateCache::new();
        assert!(cache.robot_pose().is_none());

        cache.update_joint_state(&JointState::from_pairs([("flipper_fl", 0.1), ("flipper_fr", 0.2)]));
        cache.update_joint_state(&JointState::from_pairs([("flipper_fr", 0.7)]));
        cache.update_pose(Pose::from_xy_yaw(1.0, 0.0, 0.0));
        cache.update_pose(Pose::from_xy_yaw(2.0, 0.0, 0.0));

        assert_eq!(cache.joint_state().position("flipper_fl"), Some(0.1));
        assert_eq!(cache.joint_state().position("flipper_fr"), Some(0.7));
        assert_eq!(cache.robot_pose().map(|p| p.position.x), Some(2.0));
    }
}
