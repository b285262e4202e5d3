use super::{Config, ConfigError};
use url::Url;

/// Ingestion endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://app.logflake.io";

/// Resolves the configured endpoint, falling back to [`DEFAULT_ENDPOINT`]
/// when it is absent or blank.
pub fn resolve_endpoint(endpoint: Option<&str>) -> Result<Url, ConfigError> {
    let raw = match endpoint.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => DEFAULT_ENDPOINT,
    };

    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid endpoint URL '{raw}': {e}")))?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(format!(
            "Endpoint URL '{raw}' must be a hierarchical URL"
        )));
    }

    Ok(url)
}

pub(crate) fn validate_app_id(app_id: &str) -> Result<(), ConfigError> {
    if app_id.trim().is_empty() {
        return Err(ConfigError::InvalidConfig(
            "Application id must not be empty".to_string(),
        ));
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_app_id(&self.app_id)?;
        resolve_endpoint(self.endpoint.as_deref())?;

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
