use crate::core::node::{LogSummary, NodeInfo};
use crate::error::{NavGuardError, NavGuardResult};
use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Default queue depth of a topic
pub const DEFAULT_CAPACITY: usize = 1024;

struct TopicChannel<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
}

struct RegisteredTopic {
    type_name: &'static str,
    channel: Arc<dyn Any + Send + Sync>,
}

// Topic name -> shared queue. Every Hub opened on a name talks to the same queue.
static TOPICS: Lazy<Mutex<HashMap<String, RegisteredTopic>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Lock-free counters for Hub monitoring
#[derive(Debug, Default)]
struct AtomicHubMetrics {
    messages_sent: AtomicU64,
    messages_received: AtomicU64,
    send_failures: AtomicU64,
    messages_evicted: AtomicU64,
}

impl AtomicHubMetrics {
    fn snapshot(&self) -> HubMetrics {
        HubMetrics {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            messages_evicted: self.messages_evicted.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of a Hub's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubMetrics {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub send_failures: u64,
    /// Pending messages discarded by [`Hub::send_latest`]
    pub messages_evicted: u64,
}

/// In-process pub/sub endpoint bound to a named topic
pub struct Hub<T> {
    channel: Arc<TopicChannel<T>>,
    topic_name: String,
    metrics: Arc<AtomicHubMetrics>,
}

impl<T> Clone for Hub<T> {
    fn clone(&self) -> Self {
        Self {
            channel: self.channel.clone(),
            topic_name: self.topic_name.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Hub<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("topic_name", &self.topic_name)
            .field("pending", &self.channel.receiver.len())
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Hub<T> {
    /// Open (or create) a topic with the default capacity
    pub fn new(topic_name: &str) -> NavGuardResult<Self> {
        Self::new_with_capacity(topic_name, DEFAULT_CAPACITY)
    }

    /// Open (or create) a topic. The capacity only applies when the topic is created.
    pub fn new_with_capacity(topic_name: &str, capacity: usize) -> NavGuardResult<Self> {
        let mut topics = TOPICS.lock();

        let channel = match topics.get(topic_name) {
            Some(existing) => existing
                .channel
                .clone()
                .downcast::<TopicChannel<T>>()
                .map_err(|_| NavGuardError::TopicTypeMismatch {
                    topic: topic_name.to_string(),
                    existing: existing.type_name,
                    requested: type_name::<T>(),
                })?,
            None => {
                let (sender, receiver) = bounded(capacity.max(1));
                let channel = Arc::new(TopicChannel { sender, receiver });
                topics.insert(
                    topic_name.to_string(),
                    RegisteredTopic {
                        type_name: type_name::<T>(),
                        channel: channel.clone(),
                    },
                );
                channel
            }
        };

        Ok(Hub {
            channel,
            topic_name: topic_name.to_string(),
            metrics: Arc::new(AtomicHubMetrics::default()),
        })
    }

    /// Publish a message. Returns the message back when the topic queue is full.
    pub fn send(&self, msg: T, ctx: Option<&mut NodeInfo>) -> Result<(), T>
    where
        T: LogSummary,
    {
        // Summary must be taken before the message moves into the queue
        let summary = ctx.as_ref().map(|_| msg.log_summary());

        match self.channel.sender.try_send(msg) {
            Ok(()) => {
                self.record_sent(ctx, summary);
                Ok(())
            }
            Err(TrySendError::Full(msg)) | Err(TrySendError::Disconnected(msg)) => {
                self.metrics.send_failures.fetch_add(1, Ordering::Relaxed);
                Err(msg)
            }
        }
    }

    /// Publish a message, discarding the oldest pending ones while the queue is full.
    ///
    /// The newest message always lands in the queue, so a slow consumer sees the
    /// latest state rather than a backlog.
    pub fn send_latest(&self, msg: T, ctx: Option<&mut NodeInfo>) -> Result<(), T>
    where
        T: LogSummary,
    {
        let summary = ctx.as_ref().map(|_| msg.log_summary());

        let mut pending = msg;
        loop {
            match self.channel.sender.try_send(pending) {
                Ok(()) => {
                    self.record_sent(ctx, summary);
                    return Ok(());
                }
                Err(TrySendError::Full(msg)) => {
                    if self.channel.receiver.try_recv().is_ok() {
                        self.metrics.messages_evicted.fetch_add(1, Ordering::Relaxed);
                    }
                    pending = msg;
                }
                Err(TrySendError::Disconnected(msg)) => {
                    self.metrics.send_failures.fetch_add(1, Ordering::Relaxed);
                    return Err(msg);
                }
            }
        }
    }

    fn record_sent(&self, ctx: Option<&mut NodeInfo>, summary: Option<String>) {
        self.metrics.messages_sent.fetch_add(1, Ordering::Relaxed);
        if let (Some(ctx), Some(summary)) = (ctx, summary) {
            ctx.log_pub_summary(&self.topic_name, &summary);
        }
    }

    /// Take the oldest pending message, if any
    pub fn recv(&self, ctx: Option<&mut NodeInfo>) -> Option<T>
    where
        T: LogSummary,
    {
        let msg = self.channel.receiver.try_recv().ok()?;

        if let Some(ctx) = ctx {
            ctx.log_sub_summary(&self.topic_name, &msg.log_summary());
        }
        self.metrics.messages_received.fetch_add(1, Ordering::Relaxed);

        Some(msg)
    }

    /// Number of messages waiting on the topic
    pub fn pending(&self) -> usize {
        self.channel.receiver.len()
    }

    /// Get current metrics snapshot for this handle
    pub fn get_metrics(&self) -> HubMetrics {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_share_topic() {
        let publisher: Hub<String> = Hub::new("hub_test/shared").unwrap();
        let subscriber: Hub<String> = Hub::new("hub_test/shared").unwrap();

        publisher.send("a".to_string(), None).unwrap();
        publisher.send("b".to_string(), None).unwrap();

        assert_eq!(subscriber.pending(), 2);
        assert_eq!(subscriber.recv(None), Some("a".to_string()));
        assert_eq!(subscriber.recv(None), Some("b".to_string()));
        assert_eq!(subscriber.recv(None), None);

        assert_eq!(publisher.get_metrics().messages_sent, 2);
        assert_eq!(subscriber.get_metrics().messages_received, 2);
    }

    #[test]
    fn test_full_topic_returns_message() {
        let hub: Hub<u64> = Hub::new_with_capacity("hub_test/full", 1).unwrap();

        assert!(hub.send(1, None).is_ok());
        assert_eq!(hub.send(2, None), Err(2));
        assert_eq!(hub.get_metrics().send_failures, 1);
    }

    #[test]
    fn test_send_latest_evicts_oldest() {
        let publisher: Hub<u64> = Hub::new_with_capacity("hub_test/latest", 2).unwrap();
        let subscriber: Hub<u64> = Hub::new("hub_test/latest").unwrap();

        for value in 1..=5 {
            publisher.send_latest(value, None).unwrap();
        }

        assert_eq!(subscriber.recv(None), Some(4));
        assert_eq!(subscriber.recv(None), Some(5));
        assert_eq!(subscriber.recv(None), None);

        let metrics = publisher.get_metrics();
        assert_eq!(metrics.messages_sent, 5);
        assert_eq!(metrics.messages_evicted, 3);
        assert_eq!(metrics.send_failures, 0);
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let _first: Hub<u64> = Hub::new("hub_test/typed").unwrap();
        let second = Hub::<String>::new("hub_test/typed");

        assert!(matches!(
            second,
            Err(NavGuardError::TopicTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_context_logging_counts() {
        let hub: Hub<bool> = Hub::new("hub_test/ctx").unwrap();
        let mut info = NodeInfo::new("hub_tester".to_string(), true);

        hub.send(true, Some(&mut info)).unwrap();
        assert_eq!(hub.recv(Some(&mut info)), Some(true));

        assert_eq!(info.metrics().messages_sent, 1);
        assert_eq!(info.metrics().messages_received, 1);
    }
}
