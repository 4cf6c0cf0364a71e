use crate::error::NavGuardResult;
use crate::params::RuntimeParams;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Trait for providing lightweight logging summaries of message types
///
/// Large messages (marker arrays, joint maps) should only report metadata so
/// that topic logging never clones the payload.
pub trait LogSummary {
    /// Return a compact string representation suitable for logging
    fn log_summary(&self) -> String;
}

/// Node states for monitoring and lifecycle management
#[derive(Debug, Clone, PartialEq)]
pub enum NodeState {
    Uninitialized,
    Initializing,
    Running,
    Stopping,
    Stopped,
    Error(String),
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeState::Uninitialized => write!(f, "Uninitialized"),
            NodeState::Initializing => write!(f, "Initializing"),
            NodeState::Running => write!(f, "Running"),
            NodeState::Stopping => write!(f, "Stopping"),
            NodeState::Stopped => write!(f, "Stopped"),
            NodeState::Error(msg) => write!(f, "Error: {}", msg),
        }
    }
}

/// Performance metrics for node execution
#[derive(Debug, Clone, Default)]
pub struct NodeMetrics {
    pub total_ticks: u64,
    pub successful_ticks: u64,
    pub failed_ticks: u64,
    pub avg_tick_duration_ms: f64,
    pub max_tick_duration_ms: f64,
    pub last_tick_duration_ms: f64,
    pub messages_sent: u64,
    pub messages_received: u64,
    pub errors_count: u64,
    pub warnings_count: u64,
    pub suppressed_logs: u64,
}

/// Runtime context and bookkeeping for a single node
pub struct NodeInfo {
    name: String,

    state: NodeState,
    previous_state: NodeState,

    // Log every topic publication/reception at debug level
    logging_enabled: bool,
    metrics: NodeMetrics,

    tick_start_time: Option<Instant>,

    error_history: Vec<(Instant, String)>,

    published_topics: HashMap<String, u64>,
    subscribed_topics: HashMap<String, u64>,

    // Last emission per throttle key
    throttles: HashMap<String, Instant>,

    /// Runtime parameters shared with the scheduler
    pub params: RuntimeParams,
}

impl NodeInfo {
    pub fn new(node_name: String, logging_enabled: bool) -> Self {
        Self::new_with_params(node_name, logging_enabled, RuntimeParams::with_defaults())
    }

    pub fn new_with_params(node_name: String, logging_enabled: bool, params: RuntimeParams) -> Self {
        Self {
            name: node_name,
            state: NodeState::Uninitialized,
            previous_state: NodeState::Uninitialized,
            logging_enabled,
            metrics: NodeMetrics::default(),
            tick_start_time: None,
            error_history: Vec::new(),
            published_topics: HashMap::new(),
            subscribed_topics: HashMap::new(),
            throttles: HashMap::new(),
            params,
        }
    }

    // State Management Methods
    pub fn state(&self) -> &NodeState {
        &self.state
    }

    pub fn previous_state(&self) -> &NodeState {
        &self.previous_state
    }

    pub fn set_state(&mut self, new_state: NodeState) {
        if self.state != new_state {
            self.previous_state = self.state.clone();
            self.state = new_state;
        }
    }

    pub fn transition_to_error(&mut self, error_msg: String) {
        self.log_error(&error_msg);
        self.set_state(NodeState::Error(error_msg));
    }

    // Lifecycle Methods
    pub fn initialize(&mut self) -> NavGuardResult<()> {
        self.set_state(NodeState::Initializing);
        self.set_state(NodeState::Running);
        Ok(())
    }

    pub fn shutdown(&mut self) -> NavGuardResult<()> {
        self.set_state(NodeState::Stopping);
        self.set_state(NodeState::Stopped);
        Ok(())
    }

    // Tick Management
    pub fn start_tick(&mut self) {
        self.tick_start_time = Some(Instant::now());
        if self.state == NodeState::Uninitialized {
            let _ = self.initialize();
        }
    }

    pub fn record_tick(&mut self) {
        if let Some(start_time) = self.tick_start_time.take() {
            let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

            self.metrics.total_ticks += 1;
            self.metrics.successful_ticks += 1;
            self.metrics.last_tick_duration_ms = duration_ms;

            if duration_ms > self.metrics.max_tick_duration_ms {
                self.metrics.max_tick_duration_ms = duration_ms;
            }

            let total_duration =
                self.metrics.avg_tick_duration_ms * (self.metrics.successful_ticks - 1) as f64;
            self.metrics.avg_tick_duration_ms =
                (total_duration + duration_ms) / self.metrics.successful_ticks as f64;
        }
    }

    pub fn record_tick_failure(&mut self, error_msg: String) {
        self.metrics.total_ticks += 1;
        self.metrics.failed_ticks += 1;

        if let Some(start_time) = self.tick_start_time.take() {
            self.metrics.last_tick_duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
        }

        self.log_error(&error_msg);
    }

    // Topic logging, called by Hub::send()/recv() with a pre-computed summary
    pub fn log_pub_summary(&mut self, topic: &str, summary: &str) {
        if self.logging_enabled {
            tracing::debug!(node = %self.name, topic, "--PUB--> {}", summary);
        }
        *self.published_topics.entry(topic.to_string()).or_insert(0) += 1;
        self.metrics.messages_sent += 1;
    }

    pub fn log_sub_summary(&mut self, topic: &str, summary: &str) {
        if self.logging_enabled {
            tracing::debug!(node = %self.name, topic, "<--SUB-- {}", summary);
        }
        *self.subscribed_topics.entry(topic.to_string()).or_insert(0) += 1;
        self.metrics.messages_received += 1;
    }

    pub fn log_info(&self, message: &str) {
        tracing::info!(node = %self.name, "{}", message);
    }

    pub fn log_debug(&self, message: &str) {
        tracing::debug!(node = %self.name, "{}", message);
    }

    pub fn log_warning(&mut self, message: &str) {
        tracing::warn!(node = %self.name, "{}", message);
        self.metrics.warnings_count += 1;
    }

    pub fn log_error(&mut self, message: &str) {
        tracing::error!(node = %self.name, "{}", message);

        self.error_history.push((Instant::now(), message.to_string()));
        if self.error_history.len() > 100 {
            self.error_history.remove(0);
        }
        self.metrics.errors_count += 1;
    }

    /// Warn at most once per `period` for the given key.
    ///
    /// Returns `true` when the message was emitted.
    pub fn log_warning_throttled(&mut self, key: &str, period: Duration, message: &str) -> bool {
        if !self.throttle_allows(key, period) {
            return false;
        }
        self.log_warning(message);
        true
    }

    /// Info-level counterpart of [`NodeInfo::log_warning_throttled`]
    pub fn log_info_throttled(&mut self, key: &str, period: Duration, message: &str) -> bool {
        if !self.throttle_allows(key, period) {
            return false;
        }
        self.log_info(message);
        true
    }

    fn throttle_allows(&mut self, key: &str, period: Duration) -> bool {
        let now = Instant::now();
        match self.throttles.get(key) {
            Some(last) if now.duration_since(*last) < period => {
                self.metrics.suppressed_logs += 1;
                false
            }
            _ => {
                self.throttles.insert(key.to_string(), now);
                true
            }
        }
    }

    // Getters
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn metrics(&self) -> &NodeMetrics {
        &self.metrics
    }
    pub fn error_history(&self) -> &[(Instant, String)] {
        &self.error_history
    }
    pub fn published_topics(&self) -> &HashMap<String, u64> {
        &self.published_topics
    }
    pub fn subscribed_topics(&self) -> &HashMap<String, u64> {
        &self.subscribed_topics
    }
}

/// Trait for NavGuard nodes with full lifecycle support
pub trait Node: Send {
    /// Get the node's name (must be unique)
    fn name(&self) -> &'static str;

    /// Initialize the node (called once at startup)
    fn init(&mut self, ctx: &mut NodeInfo) -> NavGuardResult<()> {
        ctx.log_info("Node initialized successfully");
        Ok(())
    }

    /// Main execution step, called repeatedly by the scheduler
    fn tick(&mut self, ctx: Option<&mut NodeInfo>);

    /// Shutdown the node (called once at cleanup)
    fn shutdown(&mut self, ctx: &mut NodeInfo) -> NavGuardResult<()> {
        ctx.log_info("Node shutdown successfully");
        Ok(())
    }
}

// LogSummary implementations for primitive types
impl LogSummary for f64 {
    fn log_summary(&self) -> String {
        format!("{:.3}", self)
    }
}

impl LogSummary for i64 {
    fn log_summary(&self) -> String {
        self.to_string()
    }
}

impl LogSummary for u64 {
    fn log_summary(&self) -> String {
        self.to_string()
    }
}

impl LogSummary for bool {
    fn log_summary(&self) -> String {
        self.to_string()
    }
}

impl LogSummary for String {
    fn log_summary(&self) -> String {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_transitions() {
        let mut info = NodeInfo::new("test_node".to_string(), false);
        assert_eq!(info.state(), &NodeState::Uninitialized);

        info.start_tick();
        assert_eq!(info.state(), &NodeState::Running);
        assert_eq!(info.previous_state(), &NodeState::Initializing);

        info.shutdown().unwrap();
        assert_eq!(info.state(), &NodeState::Stopped);
    }

    #[test]
    fn test_tick_metrics() {
        let mut info = NodeInfo::new("metrics_node".to_string(), false);

        info.start_tick();
        info.record_tick();
        info.start_tick();
        info.record_tick_failure("oracle unavailable".to_string());

        let metrics = info.metrics();
        assert_eq!(metrics.total_ticks, 2);
        assert_eq!(metrics.successful_ticks, 1);
        assert_eq!(metrics.failed_ticks, 1);
        assert_eq!(metrics.errors_count, 1);
        assert_eq!(info.error_history().len(), 1);
    }

    #[test]
    fn test_warning_throttle_suppresses_repeats() {
        let mut info = NodeInfo::new("throttle_node".to_string(), false);
        let period = Duration::from_secs(3600);

        assert!(info.log_warning_throttled("no_pose", period, "no pose"));
        assert!(!info.log_warning_throttled("no_pose", period, "no pose"));
        assert!(!info.log_warning_throttled("no_pose", period, "no pose"));

        // Independent keys are throttled separately
        assert!(info.log_warning_throttled("other", period, "other"));

        assert_eq!(info.metrics().warnings_count, 2);
        assert_eq!(info.metrics().suppressed_logs, 2);
    }

    #[test]
    fn test_zero_period_never_throttles() {
        let mut info = NodeInfo::new("unthrottled".to_string(), false);

        for _ in 0..5 {
            assert!(info.log_info_throttled("collisions", Duration::ZERO, "hit"));
        }
        assert_eq!(info.metrics().suppressed_logs, 0);
    }

    #[test]
    fn test_topic_counters() {
        let mut info = NodeInfo::new("counter".to_string(), true);
        info.log_pub_summary("cmd_vel_safe", "Twist(..)");
        info.log_pub_summary("cmd_vel_safe", "Twist(..)");
        info.log_sub_summary("cmd_vel_raw", "Twist(..)");

        assert_eq!(info.published_topics().get("cmd_vel_safe"), Some(&2));
        assert_eq!(info.subscribed_topics().get("cmd_vel_raw"), Some(&1));
        assert_eq!(info.metrics().messages_sent, 2);
        assert_eq!(info.metrics().messages_received, 1);
    }
}
