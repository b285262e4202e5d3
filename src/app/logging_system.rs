use super::config::{LogFormat, LogLevel};
use parking_lot::RwLock;
use std::str::FromStr;
use thiserror::Error;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid directive '{input}': {reason}")]
    InvalidDirective { input: String, reason: String },

    #[error("Logging system initialization failed: {details}")]
    InitFailed {
        details: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Builds the `EnvFilter` for the shipper's own diagnostics and installs the
/// global subscriber.
pub struct LoggingSystem {
    directives: RwLock<Vec<String>>,
}

impl LoggingSystem {
    pub fn new() -> Self {
        Self {
            directives: RwLock::new(Vec::new()),
        }
    }

    pub fn add_directive(&self, directive: &str) -> Result<(), LoggingError> {
        let trimmed = directive.trim();
        if !trimmed.contains('=') {
            return Err(LoggingError::InvalidDirective {
                input: directive.to_string(),
                reason: "expected 'target=level'".to_string(),
            });
        }

        Directive::from_str(trimmed).map_err(|e| LoggingError::InvalidDirective {
            input: directive.to_string(),
            reason: e.to_string(),
        })?;

        self.directives.write().push(trimmed.to_string());
        Ok(())
    }

    /// Quiets the HTTP stack, which is chatty at debug level.
    pub fn add_default_directives(&self) {
        let mut directives = self.directives.write();
        for target in ["hyper", "hyper_util", "reqwest", "h2", "rustls"] {
            directives.push(format!("{target}=warn"));
        }
    }

    pub fn build_filter_string(&self, default_level: LogLevel) -> String {
        let directives = self.directives.read();

        let mut filter_parts = Vec::with_capacity(directives.len() + 1);
        filter_parts.push(default_level.as_str().to_string());
        filter_parts.extend(directives.iter().cloned());

        filter_parts.join(",")
    }

    pub fn initialize_tracing(
        &self,
        default_level: LogLevel,
        format: LogFormat,
    ) -> Result<(), LoggingError> {
        let filter_string = self.build_filter_string(default_level);

        let env_filter =
            EnvFilter::try_new(&filter_string).map_err(|e| LoggingError::InitFailed {
                details: format!("Failed to create EnvFilter with '{filter_string}'"),
                source: Box::new(e),
            })?;

        let registry = tracing_subscriber::registry().with(env_filter);
        let result = match format {
            LogFormat::Compact => registry
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_names(true)
                        .with_level(true)
                        .compact(),
                )
                .try_init(),
            LogFormat::Json => registry
                .with(fmt::layer().json().with_thread_names(true))
                .try_init(),
        };

        result.map_err(|e| LoggingError::InitFailed {
            details: "Failed to set global tracing subscriber".to_string(),
            source: Box::new(e),
        })
    }
}

impl Default for LoggingSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Installs the global subscriber with the default directives followed by
/// `extra_directives`.
///
/// Fails on a malformed directive or if a global subscriber is already
/// installed.
pub fn setup_logging(
    level: LogLevel,
    format: LogFormat,
    extra_directives: &[String],
) -> Result<(), LoggingError> {
    let logging_system = LoggingSystem::new();
    logging_system.add_default_directives();
    for directive in extra_directives {
        logging_system.add_directive(directive)?;
    }
    logging_system.initialize_tracing(level, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_logging_system_creation() {
        let logging_system = LoggingSystem::new();
        assert_eq!(logging_system.build_filter_string(LogLevel::Info), "info");
    }

    #[test]
    fn test_add_valid_directive() {
        let logging_system = LoggingSystem::new();

        assert!(logging_system.add_directive("hyper=warn").is_ok());
        assert!(logging_system.add_directive(" rask_log_shipper=trace ").is_ok());
        assert_eq!(
            logging_system.build_filter_string(LogLevel::Warn),
            "warn,hyper=warn,rask_log_shipper=trace"
        );
    }

    #[test]
    fn test_invalid_directives_rejected() {
        let logging_system = LoggingSystem::new();

        assert!(logging_system.add_directive("invalid").is_err());
        assert!(logging_system.add_directive("").is_err());
        assert!(logging_system.add_directive("target=loud").is_err());
        assert_eq!(logging_system.build_filter_string(LogLevel::Info), "info");
    }

    #[test]
    fn test_build_filter_string() {
        let logging_system = LoggingSystem::new();
        logging_system.add_default_directives();

        let filter = logging_system.build_filter_string(LogLevel::Debug);
        assert!(filter.starts_with("debug,"));
        assert!(filter.contains("reqwest=warn"));
        assert!(filter.contains("hyper=warn"));
        assert!(EnvFilter::try_new(&filter).is_ok());
    }

    #[test]
    fn test_concurrent_directive_modification() {
        let logging_system = Arc::new(LoggingSystem::new());

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let logging_system = logging_system.clone();
                thread::spawn(move || logging_system.add_directive(&format!("target{i}=info")))
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }

        let filter = logging_system.build_filter_string(LogLevel::Info);
        assert_eq!(filter.split(',').count(), 51);
    }

    #[test]
    fn test_setup_logging_is_safe_to_repeat() {
        let first = setup_logging(LogLevel::Info, LogFormat::Compact, &[]);
        let second = setup_logging(LogLevel::Info, LogFormat::Compact, &[]);

        // Another test may have installed a subscriber first; either way the
        // second call must report, not panic.
        assert!(first.is_ok() || matches!(first, Err(LoggingError::InitFailed { .. })));
        assert!(matches!(second, Err(LoggingError::InitFailed { .. })));
    }

    #[test]
    fn test_setup_logging_rejects_malformed_extra_directive() {
        let result = setup_logging(
            LogLevel::Info,
            LogFormat::Compact,
            &["no_level_here".to_string()],
        );
        assert!(matches!(
            result,
            Err(LoggingError::InvalidDirective { input, .. }) if input == "no_level_here"
        ));
    }
}
