use clap::ValueEnum;
use serde::{Serialize, Serializer};

/// Severity of a shipped log record.
///
/// Serialized as its numeric code, which is what the ingestion endpoint
/// indexes on. This is distinct from `app::LogLevel`, which configures the
/// shipper's own tracing output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, ValueEnum)]
#[repr(u8)]
pub enum LogLevel {
    #[default]
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    Fatal = 4,
    Exception = 5,
}

impl LogLevel {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl Serialize for LogLevel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.code())
    }
}
