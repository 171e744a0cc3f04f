// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline configuration.
//!
//! Settings are stored as RON:
//! - Timeline length and tick rate
//! - Camera transition while playing
//! - Default reveal window for new layers
//! - Ruler zoom
//! - Export defaults

use crate::clock::DEFAULT_TICK_RATE_HZ;
use crate::error::ConfigError;
use crate::export::ExportSettings;
use crate::layer::{AnimationWindow, DEFAULT_WINDOW};
use crate::track::DEFAULT_TRANSITION_SECS;
use crate::view::DEFAULT_TIME_SCALE;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current config format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Default config file name
pub const CONFIG_FILE_NAME: &str = "map_animator.ron";

/// Default timeline length in seconds
pub const DEFAULT_DURATION_SECS: f64 = 15.0;

/// Timeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Format version
    pub version: u32,
    /// Timeline length in seconds
    pub duration_secs: f64,
    /// Playback tick rate
    #[serde(default = "default_tick_rate")]
    pub tick_rate_hz: f64,
    /// Camera fly duration while playing
    #[serde(default = "default_transition")]
    pub playback_transition_secs: f64,
    /// Reveal window for new layers
    #[serde(default)]
    pub default_window: AnimationWindow,
    /// Ruler scale (pixels per second)
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,
    /// Export defaults
    #[serde(default)]
    pub export: ExportSettings,
}

fn default_tick_rate() -> f64 {
    DEFAULT_TICK_RATE_HZ
}

fn default_transition() -> f64 {
    DEFAULT_TRANSITION_SECS
}

fn default_time_scale() -> f64 {
    DEFAULT_TIME_SCALE
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            duration_secs: DEFAULT_DURATION_SECS,
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
            playback_transition_secs: DEFAULT_TRANSITION_SECS,
            default_window: DEFAULT_WINDOW,
            time_scale: DEFAULT_TIME_SCALE,
            export: ExportSettings::default(),
        }
    }
}

impl TimelineConfig {
    /// Parse and validate a RON document
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let config: TimelineConfig = ron::from_str(content)?;

        if config.version > CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                supported: CONFIG_FORMAT_VERSION,
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_ron(&content)?;
        tracing::info!("Loaded timeline config from {:?}", path);
        Ok(config)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "duration_secs must be positive, got {}",
                self.duration_secs
            )));
        }
        if !self.tick_rate_hz.is_finite() || self.tick_rate_hz <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "tick_rate_hz must be positive, got {}",
                self.tick_rate_hz
            )));
        }
        if !self.playback_transition_secs.is_finite() || self.playback_transition_secs < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "playback_transition_secs must not be negative, got {}",
                self.playback_transition_secs
            )));
        }
        let window = self.default_window;
        if !window.start.is_finite()
            || !window.end.is_finite()
            || window.start < 0.0
            || window.start >= window.end
        {
            return Err(ConfigError::Invalid(format!(
                "default_window must satisfy 0 <= start < end, got {}..{}",
                window.start, window.end
            )));
        }
        self.export
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }
}
