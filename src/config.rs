use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, ScreenError};

/// Environment variable overriding the screen binary
pub const BINARY_ENV: &str = "SCREEN_RUSTY_BINARY";

/// Runtime settings for talking to screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Path or name of the screen binary
    pub binary: String,
    /// Pause after every directive, screen handles `-X` input asynchronously
    pub settle_delay_ms: u64,
    /// Directory holding per-session log files
    pub log_dir: PathBuf,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            binary: "screen".to_string(),
            settle_delay_ms: 20,
            log_dir: PathBuf::from("."),
        }
    }
}

impl ScreenConfig {
    /// Load `<config_dir>/screen-rusty/config.json`, or defaults if it is absent
    pub fn load() -> Result<Self> {
        let mut config = match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };

        if let Ok(binary) = std::env::var(BINARY_ENV) {
            if !binary.is_empty() {
                config.binary = binary;
            }
        }

        Ok(config)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("screen-rusty").join("config.json"))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: ScreenConfig =
            serde_json::from_str(json).map_err(|e| ScreenError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.binary.trim().is_empty() {
            return Err(ScreenError::Config("binary must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Log file used by screen for the given session.
    ///
    /// Always absolute: screen resolves relative paths against the
    /// session's working directory, not ours.
    pub fn log_path(&self, session_name: &str) -> Result<PathBuf> {
        let dir = if self.log_dir.is_absolute() {
            self.log_dir.clone()
        } else {
            std::env::current_dir()?.join(&self.log_dir)
        };
        Ok(dir.join(session_name))
    }
}
