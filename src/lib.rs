#![warn(rust_2018_idioms, rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::cast_possible_truncation, // Millisecond latencies fit in u64
    clippy::missing_errors_doc,       // Error enums document their variants
    clippy::module_name_repetitions,  // e.g. EngineError in engine module
    clippy::must_use_candidate,
    clippy::doc_markdown
)]

pub mod app;
pub mod buffer;
pub mod domain;
pub mod reliability;
pub mod sender;

#[cfg(test)]
mod test_support;

pub use app::{Config, Engine, EngineConfig, EngineError, EngineHandle};
pub use domain::{LogLevel, LogRecord, Params, PerformanceRecord};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
