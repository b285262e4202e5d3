//! Shared test support utilities
//!
//! Provides `RecordingTransport`, an in-memory [`Transport`] that follows a
//! scripted sequence of outcomes and records every attempt it sees, for the
//! crate's unit tests.

use crate::domain::Category;
use crate::sender::{Transport, decode_payload};
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// One delivery attempt observed by [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedAttempt {
    pub(crate) category: Category,
    /// The decoded JSON text of the request body.
    pub(crate) payload: String,
    pub(crate) delivered: bool,
}

#[derive(Clone)]
pub(crate) struct RecordingTransport {
    inner: Arc<Inner>,
}

struct Inner {
    script: Mutex<VecDeque<bool>>,
    fallback: bool,
    latency: Duration,
    attempts: Mutex<Vec<RecordedAttempt>>,
}

impl RecordingTransport {
    /// Plays `outcomes` in order, then answers `then` forever.
    pub(crate) fn scripted(outcomes: impl IntoIterator<Item = bool>, then: bool) -> Self {
        Self {
            inner: Arc::new(Inner {
                script: Mutex::new(outcomes.into_iter().collect()),
                fallback: then,
                latency: Duration::ZERO,
                attempts: Mutex::new(Vec::new()),
            }),
        }
    }

    pub(crate) fn succeeding() -> Self {
        Self::scripted([], true)
    }

    pub(crate) fn failing() -> Self {
        Self::scripted([], false)
    }

    /// Delays every attempt, simulating a slow endpoint.
    pub(crate) fn with_latency(self, latency: Duration) -> Self {
        let inner = Inner {
            script: Mutex::new(self.inner.script.lock().clone()),
            fallback: self.inner.fallback,
            latency,
            attempts: Mutex::new(Vec::new()),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    pub(crate) fn attempts(&self) -> Vec<RecordedAttempt> {
        self.inner.attempts.lock().clone()
    }

    pub(crate) fn attempt_count(&self) -> usize {
        self.inner.attempts.lock().len()
    }

    /// Payloads in the order they were attempted.
    pub(crate) fn payloads(&self) -> Vec<String> {
        self.inner
            .attempts
            .lock()
            .iter()
            .map(|attempt| attempt.payload.clone())
            .collect()
    }
}

impl Transport for RecordingTransport {
    async fn attempt_delivery(&self, category: Category, body: Bytes) -> bool {
        if !self.inner.latency.is_zero() {
            tokio::time::sleep(self.inner.latency).await;
        }

        let delivered = self
            .inner
            .script
            .lock()
            .pop_front()
            .unwrap_or(self.inner.fallback);
        let payload =
            decode_payload(&body).unwrap_or_else(|e| format!("<undecodable body: {e}>"));

        self.inner.attempts.lock().push(RecordedAttempt {
            category,
            payload,
            delivered,
        });
        delivered
    }
}
