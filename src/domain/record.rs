use super::log_level::LogLevel;
use serde::Serialize;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::Write;

/// Free-form key/value parameters attached to a log record.
pub type Params = HashMap<String, serde_json::Value>;

/// Document enqueued on the `logs` queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub level: LogLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
}

impl LogRecord {
    pub fn new(level: LogLevel, content: impl Into<String>) -> Self {
        Self {
            level,
            hostname: None,
            content: content.into(),
            correlation: None,
            params: None,
        }
    }

    pub fn with_hostname(mut self, hostname: Option<String>) -> Self {
        self.hostname = hostname;
        self
    }

    pub fn with_correlation(mut self, correlation: Option<String>) -> Self {
        self.correlation = correlation;
        self
    }

    pub fn with_params(mut self, params: Option<Params>) -> Self {
        self.params = params;
        self
    }

    /// Builds an `Exception` level record from an error and its source chain.
    pub fn from_error(error: &(dyn Error + 'static)) -> Self {
        Self::new(LogLevel::Exception, format_error_chain(error))
    }
}

/// Document enqueued on the `performances` queue. `duration` is in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformanceRecord {
    pub label: String,
    pub duration: i64,
}

impl PerformanceRecord {
    pub fn new(label: impl Into<String>, duration: i64) -> Self {
        Self {
            label: label.into(),
            duration,
        }
    }
}

/// Renders an error followed by one `Caused by:` line per source.
pub fn format_error_chain(error: &(dyn Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(rendered, "\nCaused by: {cause}");
        source = cause.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use thiserror::Error;

    #[derive(Error, Debug)]
    #[error("connection reset")]
    struct Root;

    #[derive(Error, Debug)]
    #[error("failed to load profile")]
    struct Outer(#[source] Root);

    #[test]
    fn test_log_record_omits_absent_fields() {
        let record = LogRecord::new(LogLevel::Info, "hello");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!({ "level": 1, "content": "hello" }));
    }

    #[test]
    fn test_log_record_with_all_fields() {
        let mut params = Params::new();
        params.insert("user".to_string(), json!("alice"));
        params.insert("retries".to_string(), json!(2));

        let record = LogRecord::new(LogLevel::Error, "boom")
            .with_hostname(Some("web-01".to_string()))
            .with_correlation(Some("req-42".to_string()))
            .with_params(Some(params));

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "level": 3,
                "hostname": "web-01",
                "content": "boom",
                "correlation": "req-42",
                "params": { "user": "alice", "retries": 2 }
            })
        );
    }

    #[test]
    fn test_performance_record_shape() {
        let value = serde_json::to_value(PerformanceRecord::new("op", 42)).unwrap();
        assert_eq!(value, json!({ "label": "op", "duration": 42 }));
    }

    #[test]
    fn test_error_chain_includes_sources() {
        let error = Outer(Root);
        assert_eq!(
            format_error_chain(&error),
            "failed to load profile\nCaused by: connection reset"
        );

        let record = LogRecord::from_error(&error);
        assert_eq!(record.level, LogLevel::Exception);
        assert!(record.content.starts_with("failed to load profile"));
    }

    #[test]
    fn test_error_without_source() {
        assert_eq!(format_error_chain(&Root), "connection reset");
    }
}
