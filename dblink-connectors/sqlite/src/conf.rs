use std::path::PathBuf;

use dblink_core::{
    config,
    err::Result,
};
use serde::{Deserialize, Serialize};

/// The connection config for the sqlite bridge
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SqliteConnectionConfig {
    /// Path of the database file. An in-memory database when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl SqliteConnectionConfig {
    pub fn parse(options: config::Value) -> Result<Self> {
        config::parse_options(options)
    }

    pub fn in_memory() -> Self {
        Self { path: None }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }
}
