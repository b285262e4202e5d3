pub mod retry;

pub use retry::{DiscardReason, MAX_RETRIES, RetryDecision, RetryError, RetryPolicy};
