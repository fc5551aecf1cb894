//! # Host Configuration
//!
//! JSON configuration for the scripted host. Every field is optional.
//!
//! ```json
//! {
//!   "presentation": { "placeholder_text": "Please wait" },
//!   "start_paused": true,
//!   "frame_interval_ms": 16.0,
//!   "interpose_scheduler": true
//! }
//! ```

use serde::{Deserialize, Serialize};
use services_runtime_host::PresentationSettings;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Host configuration error types
#[derive(Debug, Error)]
pub enum HostConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Scripted host configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Module and element naming for the controller
    pub presentation: PresentationSettings,
    /// Pause the frame scheduler before the script starts
    pub start_paused: bool,
    /// Simulated display refresh interval
    pub frame_interval_ms: f64,
    /// Interpose the scheduler on the simulated display
    ///
    /// Without interposition frame requests queue up but never fire.
    pub interpose_scheduler: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            presentation: PresentationSettings::default(),
            start_paused: false,
            frame_interval_ms: 16.0,
            interpose_scheduler: true,
        }
    }
}

impl HostConfig {
    /// Parses a configuration from JSON text
    pub fn from_json(text: &str) -> Result<Self, HostConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a configuration file
    pub fn load(path: &Path) -> Result<Self, HostConfigError> {
        let text = fs::read_to_string(path).map_err(|source| HostConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }
}
