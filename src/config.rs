// SPDX-License-Identifier: GPL-3.0-only

use crate::constants;
use crate::detect::LabThreshold;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Capture device path
    pub device: String,
    /// Capture resolution width
    pub width: u32,
    /// Capture resolution height
    pub height: u32,
    /// Lab color threshold for the target objects
    pub threshold: LabThreshold,
    /// Minimum pixel count for a region to count as an object
    pub min_blob_area: u32,
    /// Sensor warm-up time in milliseconds
    pub warm_up_ms: u64,
    /// Sysfs name of the red status LED
    pub red_led: String,
    /// Sysfs name of the green status LED
    pub green_led: String,
    /// Sysfs name of the blue heartbeat LED
    pub blue_led: String,
    /// Drive the status LEDs (disable for headless/desktop use)
    pub leds_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: constants::DEFAULT_DEVICE.to_string(),
            width: constants::FRAME_WIDTH,
            height: constants::FRAME_HEIGHT,
            threshold: constants::BLACK_THRESHOLD,
            min_blob_area: constants::MIN_BLACK_AREA,
            warm_up_ms: constants::WARM_UP.as_millis() as u64,
            red_led: constants::DEFAULT_RED_LED.to_string(),
            green_led: constants::DEFAULT_GREEN_LED.to_string(),
            blue_led: constants::DEFAULT_BLUE_LED.to_string(),
            leds_enabled: true,
        }
    }
}

impl Config {
    /// Path of the config file under the user config directory
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("blackspot").join("config.json"))
    }

    /// Load the config file, falling back to defaults when it is missing
    /// or unreadable
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Invalid config file, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read config file, using defaults");
                Self::default()
            }
        }
    }

    /// Write the config file, creating its directory if needed
    pub fn save(&self) -> AppResult<()> {
        let path =
            Self::path().ok_or_else(|| AppError::Config("no config directory".to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents =
            serde_json::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(&path, contents)?;
        Ok(())
    }
}
