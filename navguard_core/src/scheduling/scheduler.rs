use crate::core::{Node, NodeInfo, NodeState};
use crate::error::{NavGuardError, NavGuardResult};
use crate::params::RuntimeParams;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Fallback tick rate when `tick_rate` is missing or invalid
const DEFAULT_TICK_RATE_HZ: f64 = 100.0;

struct RegisteredNode {
    node: Box<dyn Node>,
    priority: u32,
    initialized: bool,
    context: NodeInfo,
}

/// Central orchestrator: holds nodes, drives the tick loop.
pub struct Scheduler {
    nodes: Vec<RegisteredNode>,
    running: Arc<AtomicBool>,
    scheduler_name: String,
    params: RuntimeParams,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Create an empty scheduler with in-memory default parameters
    pub fn new() -> Self {
        Self::with_params(RuntimeParams::with_defaults())
    }

    /// Create an empty scheduler sharing the given parameter store with its nodes
    pub fn with_params(params: RuntimeParams) -> Self {
        Self {
            nodes: Vec::new(),
            running: Arc::new(AtomicBool::new(true)),
            scheduler_name: "NavGuardScheduler".to_string(),
            params,
        }
    }

    /// Set the scheduler name (chainable)
    pub fn name(mut self, name: &str) -> Self {
        self.scheduler_name = name.to_string();
        self
    }

    /// Parameter store shared with every registered node
    pub fn params(&self) -> &RuntimeParams {
        &self.params
    }

    /// Add a node with given priority (lower number = higher priority).
    ///
    /// # Example
    /// ```ignore
    /// scheduler.add(node, 0, None);   // Highest priority
    /// scheduler.add(node, 10, None);  // Lower priority
    /// ```
    pub fn add(
        &mut self,
        node: Box<dyn Node>,
        priority: u32,
        logging_enabled: Option<bool>,
    ) -> &mut Self {
        let node_name = node.name().to_string();
        let logging_enabled = logging_enabled.unwrap_or(false);
        let context =
            NodeInfo::new_with_params(node_name.clone(), logging_enabled, self.params.clone());

        self.nodes.push(RegisteredNode {
            node,
            priority,
            initialized: false,
            context,
        });
        // Stable sort keeps insertion order among equal priorities
        self.nodes.sort_by_key(|registered| registered.priority);

        tracing::info!(
            scheduler = %self.scheduler_name,
            "Added node '{}' with priority {} (logging: {})",
            node_name,
            priority,
            logging_enabled
        );

        self
    }

    /// Check if the scheduler is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop the scheduler
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Run one dispatch round: every node ticks exactly once, in priority order
    pub fn tick_once(&mut self) -> NavGuardResult<()> {
        self.initialize_nodes();

        for registered in self.nodes.iter_mut() {
            if !registered.initialized {
                continue;
            }
            let ctx = &mut registered.context;
            ctx.start_tick();
            registered.node.tick(Some(&mut *ctx));
            ctx.record_tick();
        }

        Ok(())
    }

    /// Main loop with Ctrl+C handling, runs until [`Scheduler::stop`] is called
    pub fn run(&mut self) -> NavGuardResult<()> {
        self.run_until(None)
    }

    /// Run all nodes for a specified duration, then shutdown gracefully
    pub fn run_for(&mut self, duration: Duration) -> NavGuardResult<()> {
        self.run_until(Some(duration))
    }

    fn run_until(&mut self, duration: Option<Duration>) -> NavGuardResult<()> {
        let start_time = Instant::now();

        let running = self.running.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            tracing::warn!("Ctrl+C received, shutting down scheduler");
            running.store(false, Ordering::Release);
        }) {
            // Only one handler per process; a second scheduler keeps the first one
            tracing::debug!("Signal handler not installed: {}", e);
        }

        while self.is_running() {
            if let Some(max_duration) = duration {
                if start_time.elapsed() >= max_duration {
                    tracing::info!("Scheduler reached time limit of {:?}", max_duration);
                    break;
                }
            }

            let round_start = Instant::now();
            self.tick_once()?;

            let period = self.tick_period();
            if let Some(remaining) = period.checked_sub(round_start.elapsed()) {
                std::thread::sleep(remaining);
            }
        }

        self.shutdown_nodes();
        tracing::info!(scheduler = %self.scheduler_name, "Scheduler shutdown complete");
        Ok(())
    }

    fn tick_period(&self) -> Duration {
        let rate_hz = self.params.get_f64("tick_rate", DEFAULT_TICK_RATE_HZ);
        let rate_hz = if rate_hz.is_finite() && rate_hz > 0.0 {
            rate_hz
        } else {
            DEFAULT_TICK_RATE_HZ
        };
        Duration::from_secs_f64(1.0 / rate_hz)
    }

    fn initialize_nodes(&mut self) {
        for registered in self.nodes.iter_mut() {
            if registered.initialized || matches!(registered.context.state(), NodeState::Error(_)) {
                continue;
            }

            let node_name = registered.node.name();
            let ctx = &mut registered.context;
            match registered.node.init(ctx) {
                Ok(()) => {
                    let _ = ctx.initialize();
                    registered.initialized = true;
                    tracing::info!("Initialized node '{}'", node_name);
                }
                Err(e) => {
                    ctx.transition_to_error(format!("Initialization failed: {}", e));
                }
            }
        }
    }

    fn shutdown_nodes(&mut self) {
        for registered in self.nodes.iter_mut() {
            if !registered.initialized {
                continue;
            }

            let node_name = registered.node.name();
            let ctx = &mut registered.context;
            match registered.node.shutdown(ctx) {
                Ok(()) => tracing::info!("Shutdown node '{}' successfully", node_name),
                Err(e) => tracing::error!("Error shutting down node '{}': {}", node_name, e),
            }
            let _ = ctx.shutdown();
            registered.initialized = false;
        }
    }

    /// Get the names of all registered nodes, in dispatch order
    pub fn get_node_list(&self) -> Vec<String> {
        self.nodes
            .iter()
            .map(|registered| registered.node.name().to_string())
            .collect()
    }

    /// Runtime context of a registered node
    pub fn node_info(&self, name: &str) -> NavGuardResult<&NodeInfo> {
        self.nodes
            .iter()
            .find(|registered| registered.node.name() == name)
            .map(|registered| &registered.context)
            .ok_or_else(|| NavGuardError::NodeNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingNode {
        name: &'static str,
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Node for RecordingNode {
        fn name(&self) -> &'static str {
            self.name
        }

        fn tick(&mut self, _ctx: Option<&mut NodeInfo>) {
            self.order.lock().unwrap().push(self.name);
        }
    }

    struct FailingInitNode;

    impl Node for FailingInitNode {
        fn name(&self) -> &'static str {
            "failing_init"
        }

        fn init(&mut self, _ctx: &mut NodeInfo) -> NavGuardResult<()> {
            Err(NavGuardError::Internal("no oracle".to_string()))
        }

        fn tick(&mut self, _ctx: Option<&mut NodeInfo>) {
            panic!("must never tick");
        }
    }

    #[test]
    fn test_priority_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut scheduler = Scheduler::new();

        scheduler
            .add(
                Box::new(RecordingNode {
                    name: "low",
                    order: order.clone(),
                }),
                10,
                None,
            )
            .add(
                Box::new(RecordingNode {
                    name: "high",
                    order: order.clone(),
                }),
                0,
                None,
            );

        scheduler.tick_once().unwrap();
        scheduler.tick_once().unwrap();

        assert_eq!(*order.lock().unwrap(), vec!["high", "low", "high", "low"]);
        assert_eq!(scheduler.get_node_list(), vec!["high", "low"]);
        assert_eq!(scheduler.node_info("low").unwrap().metrics().total_ticks, 2);
    }

    #[test]
    fn test_failed_init_is_skipped() {
        let mut scheduler = Scheduler::new();
        scheduler.add(Box::new(FailingInitNode), 0, None);

        scheduler.tick_once().unwrap();

        let info = scheduler.node_info("failing_init").unwrap();
        assert!(matches!(info.state(), NodeState::Error(_)));
        assert!(matches!(
            scheduler.node_info("missing"),
            Err(NavGuardError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_run_for_stops() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut scheduler = Scheduler::new();
        scheduler.params().set("tick_rate", 1000).unwrap();
        scheduler.add(
            Box::new(RecordingNode {
                name: "timed",
                order: order.clone(),
            }),
            0,
            None,
        );

        scheduler.run_for(Duration::from_millis(20)).unwrap();

        assert!(!order.lock().unwrap().is_empty());
        assert_eq!(
            scheduler.node_info("timed").unwrap().state(),
            &NodeState::Stopped
        );
    }
}
