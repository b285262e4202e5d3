use super::serde_helpers::{
    load_env_enum, load_env_list, load_env_string, load_env_string_opt, load_env_var,
};
use super::{ConfigError, LogFormat, LogLevel};
use crate::app::engine::EngineConfig;
use crate::sender::ClientConfig;
use clap::{ArgAction, Args};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn default_timeout_secs() -> u64 {
    3
}

fn default_announce_startup() -> bool {
    true
}

#[derive(Args, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Application id records are filed under
    #[arg(long, env = "RASK_APP_ID", default_value = "")]
    pub app_id: String,

    /// Ingestion endpoint URL (production endpoint when omitted)
    #[arg(long, env = "RASK_ENDPOINT")]
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Hostname attached to log records (machine name when omitted)
    #[arg(long, env = "RASK_HOSTNAME")]
    #[serde(default)]
    pub hostname: Option<String>,

    /// Per-attempt delivery timeout in seconds
    #[arg(long, env = "RASK_TIMEOUT_SECS", default_value = "3")]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Ship a diagnostic record when the engine starts
    #[arg(
        long,
        env = "RASK_ANNOUNCE_STARTUP",
        default_value_t = true,
        action = ArgAction::Set
    )]
    #[serde(default = "default_announce_startup")]
    pub announce_startup: bool,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", default_value = "compact")]
    #[serde(default)]
    pub log_format: LogFormat,

    /// Extra tracing filter directive as target=level (repeatable)
    #[arg(long = "log-directive", env = "RASK_LOG_DIRECTIVES", value_delimiter = ',')]
    #[serde(default)]
    pub log_directives: Vec<String>,

    /// Configuration file path (optional)
    #[arg(long, env = "RASK_CONFIG_FILE")]
    #[serde(skip)]
    pub config_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            endpoint: None,
            hostname: None,
            timeout_secs: default_timeout_secs(),
            announce_startup: default_announce_startup(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Compact,
            log_directives: Vec::new(),
            config_file: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        load_env_string("RASK_APP_ID", &mut config.app_id);
        load_env_string_opt("RASK_ENDPOINT", &mut config.endpoint);
        load_env_string_opt("RASK_HOSTNAME", &mut config.hostname);
        load_env_var("RASK_TIMEOUT_SECS", &mut config.timeout_secs)?;
        load_env_var("RASK_ANNOUNCE_STARTUP", &mut config.announce_startup)?;
        load_env_enum("LOG_LEVEL", &mut config.log_level)?;
        load_env_enum("LOG_FORMAT", &mut config.log_format)?;
        load_env_list("RASK_LOG_DIRECTIVES", &mut config.log_directives);

        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Replaces this configuration with the referenced file, if any, and
    /// validates the result.
    pub fn load(self) -> Result<Self, ConfigError> {
        match &self.config_file {
            Some(path) => Self::from_file(path),
            None => {
                self.validate()?;
                Ok(self)
            }
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        self.validate()?;

        let mut engine_config = EngineConfig::new(self.app_id.clone());
        engine_config.endpoint = self.endpoint.clone();
        engine_config.hostname = self.hostname.clone();
        engine_config.announce_startup = self.announce_startup;
        engine_config.client = ClientConfig {
            timeout: self.timeout(),
            ..ClientConfig::default()
        };
        Ok(engine_config)
    }
}
