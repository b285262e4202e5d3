use super::engine::EngineShared;
use crate::reliability::{DiscardReason, RetryDecision, RetryPolicy};
use crate::sender::{Transport, encode_json};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle of the dispatcher worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum DispatcherState {
    Idle = 0,
    Draining = 1,
    ShuttingDown = 2,
    Stopped = 3,
}

impl DispatcherState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => DispatcherState::Idle,
            1 => DispatcherState::Draining,
            2 => DispatcherState::ShuttingDown,
            _ => DispatcherState::Stopped,
        }
    }

    pub fn is_stopped(self) -> bool {
        self == DispatcherState::Stopped
    }
}

impl std::fmt::Display for DispatcherState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DispatcherState::Idle => "idle",
            DispatcherState::Draining => "draining",
            DispatcherState::ShuttingDown => "shutting_down",
            DispatcherState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// The single consumer of the delivery queue.
///
/// Attempts run strictly one at a time. A failed record goes to the back of
/// the queue until the retry policy gives up on it.
pub(crate) struct Dispatcher<T: Transport> {
    shared: Arc<EngineShared>,
    transport: T,
    policy: RetryPolicy,
}

impl<T: Transport> Dispatcher<T> {
    pub(crate) fn new(shared: Arc<EngineShared>, transport: T, policy: RetryPolicy) -> Self {
        Self {
            shared,
            transport,
            policy,
        }
    }

    /// Runs until shutdown is requested and the queue is empty.
    pub(crate) async fn run(self) {
        info!(max_attempts = self.policy.max_attempts(), "Dispatcher started");

        loop {
            if !self.shared.shutdown_requested() {
                self.shared.set_state(DispatcherState::Idle);
                self.shared.queue.wait_for_wake().await;
            }

            self.shared.set_state(DispatcherState::Draining);
            self.drain().await;

            if self.shared.shutdown_requested() && self.shared.queue.close_if_empty() {
                break;
            }
        }

        self.shared.set_state(DispatcherState::ShuttingDown);
        let stats = self.shared.stats.snapshot();
        info!(
            attempts = stats.attempts,
            delivered = stats.delivered,
            dropped = stats.dropped,
            "Dispatcher drained queue, stopping"
        );
        self.shared.set_state(DispatcherState::Stopped);
    }

    async fn drain(&self) {
        while let Some(mut record) = self.shared.queue.dequeue_if_any() {
            let attempt = record.record_attempt();
            let category = record.category();

            let delivered = match encode_json(record.payload()) {
                Ok(body) => self.transport.attempt_delivery(category, body).await,
                Err(e) => {
                    self.shared.stats.record_encoding_failure();
                    warn!(queue = %category, attempt, error = %e, "Failed to encode record");
                    false
                }
            };
            self.shared.stats.record_attempt(delivered);

            match self.policy.decide(&record, delivered) {
                RetryDecision::Requeue => {
                    debug!(queue = %category, attempt, "Requeueing record for retry");
                    self.shared.stats.record_requeued();
                    self.shared.queue.requeue(record);
                }
                RetryDecision::Discard(DiscardReason::Delivered) => {}
                RetryDecision::Discard(DiscardReason::RetriesExhausted) => {
                    self.shared.stats.record_dropped();
                    warn!(
                        queue = %category,
                        attempts = attempt,
                        "Dropping record after exhausting retries"
                    );
                }
            }
        }
    }
}
