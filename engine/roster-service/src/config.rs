//! Configuration for the roster service

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the roster service: where the dataset and the undo
/// stack live on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base directory for the store document and the undo stack
    pub data_dir: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("./data") }
    }
}

impl ServiceConfig {
    /// Create a new configuration with a custom data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    /// Path of the store document
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("roster.json")
    }

    /// Directory holding the undo stack entries
    pub fn undo_dir(&self) -> PathBuf {
        self.data_dir.join("undo_stack")
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.data_dir.as_os_str().is_empty() {
            return Err("data_dir must not be empty".to_string());
        }

        Ok(())
    }
}
