//! Domain layer for rask-log-shipper.
//!
//! Contains the value types that flow through the delivery engine:
//! - `Category`: destination classification (logs / performances)
//! - `PendingRecord`: one encoded record awaiting delivery
//! - `LogRecord` / `PerformanceRecord`: the JSON documents shipped to the endpoint
//! - `LogLevel`: severity carried by log records

pub mod category;
pub mod log_level;
pub mod pending;
pub mod record;

pub use category::{Category, CategoryError};
pub use log_level::LogLevel;
pub use pending::PendingRecord;
pub use record::{LogRecord, Params, PerformanceRecord, format_error_chain};
