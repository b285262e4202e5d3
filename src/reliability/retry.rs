use crate::domain::PendingRecord;
use thiserror::Error;

/// Delivery attempts allowed per record before it is abandoned.
pub const MAX_RETRIES: u32 = 3;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RetryError {
    #[error("Invalid retry configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    Delivered,
    RetriesExhausted,
}

/// What the dispatcher does with a record after an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Append the record to the back of the queue.
    Requeue,
    Discard(DiscardReason),
}

/// Bounded, delay-free retry policy.
///
/// Failed records are requeued immediately; there is no backoff between
/// attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Result<Self, RetryError> {
        if max_attempts == 0 {
            return Err(RetryError::InvalidConfig(
                "max_attempts must be greater than 0".to_string(),
            ));
        }
        Ok(Self { max_attempts })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decides the fate of a record whose attempt counter already includes
    /// the attempt that just finished.
    pub fn decide(&self, record: &PendingRecord, delivered: bool) -> RetryDecision {
        if delivered {
            RetryDecision::Discard(DiscardReason::Delivered)
        } else if record.attempts() >= self.max_attempts {
            RetryDecision::Discard(DiscardReason::RetriesExhausted)
        } else {
            RetryDecision::Requeue
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRIES,
        }
    }
}
