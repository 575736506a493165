// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{self, quality, strip, timing};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// What the sequencer does when no frame is available at shutter time
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "mode")]
pub enum MissingFramePolicy {
    /// Drop the shot and move on (fewer photos in the session)
    #[default]
    Skip,
    /// Try again, then drop the shot
    Retry {
        /// Extra attempts after the first one
        attempts: u32,
        /// Wait between attempts
        interval_ms: u64,
    },
}

impl MissingFramePolicy {
    /// Retry with the default interval
    pub fn retry(attempts: u32) -> Self {
        MissingFramePolicy::Retry {
            attempts,
            interval_ms: timing::FRAME_RETRY_INTERVAL_MS,
        }
    }

    /// Extra attempts allowed after the first one
    pub fn retries(&self) -> u32 {
        match self {
            MissingFramePolicy::Skip => 0,
            MissingFramePolicy::Retry { attempts, .. } => *attempts,
        }
    }

    /// Wait between two attempts
    pub fn interval(&self) -> Duration {
        match self {
            MissingFramePolicy::Skip => Duration::ZERO,
            MissingFramePolicy::Retry { interval_ms, .. } => Duration::from_millis(*interval_ms),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Filter selected when the booth opens
    pub default_filter: String,
    /// How long each countdown tick is shown (ms)
    pub countdown_interval_ms: u64,
    /// Pause after each shot (ms)
    pub shot_pause_ms: u64,
    /// JPEG quality of each photo (1-100)
    pub photo_quality: u8,
    /// JPEG quality of the exported strip (1-100)
    pub strip_quality: u8,
    /// Raster scale of the exported strip
    pub strip_scale: u32,
    /// Mirror captured frames horizontally (selfie mode)
    pub mirror: bool,
    /// Missing-frame handling during a run
    pub missing_frame: MissingFramePolicy,
    /// Folder (under the pictures directory) strips are saved to
    pub save_folder: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_filter: constants::DEFAULT_FILTER_ID.to_string(),
            countdown_interval_ms: timing::COUNTDOWN_TICK_MS,
            shot_pause_ms: timing::SHOT_PAUSE_MS,
            photo_quality: quality::PHOTO_JPEG_QUALITY,
            strip_quality: quality::STRIP_JPEG_QUALITY,
            strip_scale: strip::DEFAULT_SCALE,
            mirror: true, // Default to mirrored (selfie mode)
            missing_frame: MissingFramePolicy::default(),
            save_folder: constants::DEFAULT_SAVE_FOLDER.to_string(),
        }
    }
}

impl Config {
    /// `<config_dir>/photobooth/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("photobooth").join("config.json"))
    }

    /// Load from the default location, defaults when absent
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from a file, defaults when the file does not exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Read(format!("{}: {}", path.display(), e))),
        };

        let config: Self = serde_json::from_str(&json)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))?;
        config.validate()?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Write as pretty JSON, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write(e.to_string()))?;
        }
        let json =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Write(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| ConfigError::Write(e.to_string()))
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("photo_quality", self.photo_quality),
            ("strip_quality", self.strip_quality),
        ] {
            if !(1..=100).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within 1-100, got {}",
                    name, value
                )));
            }
        }
        if self.strip_scale == 0 {
            return Err(ConfigError::Invalid("strip_scale must be at least 1".into()));
        }
        if self.default_filter.trim().is_empty() {
            return Err(ConfigError::Invalid("default_filter must not be empty".into()));
        }
        Ok(())
    }

    pub fn countdown_interval(&self) -> Duration {
        Duration::from_millis(self.countdown_interval_ms)
    }

    pub fn shot_pause(&self) -> Duration {
        Duration::from_millis(self.shot_pause_ms)
    }

    /// Directory strips and photos are written to
    pub fn save_dir(&self) -> PathBuf {
        dirs::picture_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(&self.save_folder)
    }
}
