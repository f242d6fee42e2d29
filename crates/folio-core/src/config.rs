//! Editor configuration.
//!
//! Every field has a default, so a configuration file only needs to name
//! what it overrides:
//!
//! ```json
//! { "history_limit": 100, "autosave_quiet_period_ms": 2000 }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables for the editor, pagination and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undo entries kept.
    pub history_limit: usize,
    /// Height assumed for a section that has not been measured yet.
    pub default_section_height: f64,
    /// Combined top and bottom page padding subtracted from the page height.
    pub page_margin_y: f64,
    /// How long the document must stay unchanged before autosave writes it.
    pub autosave_quiet_period_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: crate::history::DEFAULT_HISTORY_LIMIT,
            default_section_height: crate::pagination::DEFAULT_SECTION_HEIGHT,
            page_margin_y: crate::pagination::PAGE_MARGIN_Y,
            autosave_quiet_period_ms: 1000,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    pub fn autosave_quiet_period(&self) -> Duration {
        Duration::from_millis(self.autosave_quiet_period_ms)
    }
}
