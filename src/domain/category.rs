use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown ingestion queue: {0}")]
pub struct CategoryError(pub String);

/// Destination queue on the ingestion endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Log,
    Performance,
}

impl Category {
    /// Path segment used in `/api/ingestion/{app_id}/{queue_path}`.
    pub const fn queue_path(self) -> &'static str {
        match self {
            Category::Log => "logs",
            Category::Performance => "performances",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.queue_path())
    }
}

impl FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "logs" => Ok(Category::Log),
            "performances" => Ok(Category::Performance),
            other => Err(CategoryError(other.to_string())),
        }
    }
}
