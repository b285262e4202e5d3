use super::config::Config;
use super::engine::EngineHandle;
use crate::domain::{LogLevel, Params};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "rask-log-shipper",
    version,
    about = "Ship log and performance records to a telemetry ingestion endpoint"
)]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Ship one log record
    Log {
        content: String,

        #[arg(long, value_enum, default_value = "info")]
        level: LogLevel,

        /// Correlation id tying the record to a request or job
        #[arg(long)]
        correlation: Option<String>,

        /// Extra parameter as key=value; JSON values are kept typed
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, serde_json::Value)>,
    },

    /// Ship one performance sample
    Performance {
        label: String,

        /// Duration in milliseconds
        #[arg(allow_negative_numbers = true)]
        duration_ms: i64,
    },
}

impl Command {
    /// Queues the record this command describes.
    pub fn enqueue(&self, handle: &EngineHandle) {
        match self {
            Command::Log {
                content,
                level,
                correlation,
                params,
            } => {
                let params = (!params.is_empty())
                    .then(|| params.iter().cloned().collect::<Params>());
                handle.send_log_with(*level, correlation.as_deref(), content.clone(), params);
            }
            Command::Performance { label, duration_ms } => {
                handle.send_performance(label.clone(), *duration_ms);
            }
        }
    }
}

fn parse_param(raw: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("parameter key is empty in '{raw}'"));
    }

    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
