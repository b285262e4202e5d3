pub mod command;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod hostname;
pub mod logging_system;

pub use command::{Cli, Command};
pub use config::{Config, ConfigError, LogFormat, LogLevel};
pub use dispatcher::DispatcherState;
pub use engine::{Engine, EngineConfig, EngineError, EngineHandle};
pub use logging_system::{LoggingError, LoggingSystem, setup_logging};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

/// Entry point of the `rask-log-shipper` binary: ships one record and waits
/// for it to be delivered or dropped.
pub fn run<I, T>(args: I) -> anyhow::Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let config = cli.config.load().context("Failed to load configuration")?;

    if let Err(e) = setup_logging(config.log_level, config.log_format, &config.log_directives) {
        eprintln!("Logging setup failed, continuing without tracing output: {e}");
    }

    info!("Starting rask-log-shipper v{}", env!("CARGO_PKG_VERSION"));

    let engine_config = config
        .engine_config()
        .context("Invalid engine configuration")?;
    let engine = Engine::new(engine_config).context("Failed to start telemetry engine")?;

    cli.command.enqueue(&engine.handle());

    let handle = engine.handle();
    engine.shutdown().context("Telemetry engine did not shut down cleanly")?;

    let stats = handle.stats();
    if stats.dropped > 0 {
        warn!(
            "{} record(s) dropped after {} failed attempt(s)",
            stats.dropped, stats.failed_attempts
        );
    }
    info!(
        "rask-log-shipper finished: {} delivered, {} dropped",
        stats.delivered, stats.dropped
    );
    Ok(())
}
