//! Application configuration types.
//!
//! The top-level [`Config`] carries the engine location and queue settings.
//! Every section defaults sensibly so an empty file is valid. Codec
//! parameters are fixed policy and deliberately absent here.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;
use crate::Error;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tools: ToolsConfig,
    pub queue: QueueConfig,
}

impl Config {
    /// Parse a `Config` from TOML text. Missing sections take their defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(ref path) = self.tools.ffmpeg_path {
            if !path.exists() {
                warnings.push(format!(
                    "tools.ffmpeg_path {} does not exist; falling back to discovery",
                    path.display()
                ));
            }
        }

        if self.queue.event_capacity == 0 {
            warnings.push("queue.event_capacity is 0; using 1".into());
        }

        warnings
    }
}

/// Location of the transcoding engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
}

/// Queue and event settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Capacity of the broadcast channel feeding the display surface.
    pub event_capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { event_capacity: 64 }
    }
}
