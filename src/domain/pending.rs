use super::category::Category;

/// A serialized record waiting in the delivery queue.
///
/// Only the dispatcher mutates a record once it has been enqueued, and only
/// through [`PendingRecord::record_attempt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRecord {
    category: Category,
    payload: String,
    attempts: u32,
}

impl PendingRecord {
    pub fn new(category: Category, payload: impl Into<String>) -> Self {
        Self {
            category,
            payload: payload.into(),
            attempts: 0,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// JSON text of the record.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Counts one delivery attempt and returns the new total.
    pub fn record_attempt(&mut self) -> u32 {
        self.attempts = self.attempts.saturating_add(1);
        self.attempts
    }
}
