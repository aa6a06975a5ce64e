//! Session configuration
//!
//! Stored as JSON at `~/.local/share/voxmemo/config.json`. Every key is
//! optional; missing keys fall back to the defaults below.

use crate::gesture::GestureThresholds;
use crate::waveform::{DEFAULT_LIVE_CAP, DEFAULT_WAVEFORM_POINTS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid config value for {key}: {reason}")]
    Invalid { key: &'static str, reason: &'static str },
}

/// Encoder parameters handed to the capture device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    pub sample_rate: u32,
    pub bit_rate: u32,
    pub channels: u16,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            bit_rate: 128_000,
            channels: 1,
        }
    }
}

/// Where the playback cursor comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSource {
    /// Fixed-increment clock, immune to a flaky device position API
    #[default]
    Clock,
    /// Ask the playback device each tick, falling back to the clock on error
    Device,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub duration_tick_ms: u64,
    pub amplitude_sample_ms: u64,
    pub playback_tick_ms: u64,
    pub live_amplitude_cap: usize,
    pub waveform_points: usize,
    pub capture: CaptureSettings,
    pub gesture: GestureThresholds,
    pub position_source: PositionSource,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_tick_ms: 100,
            amplitude_sample_ms: 50,
            playback_tick_ms: 100,
            live_amplitude_cap: DEFAULT_LIVE_CAP,
            waveform_points: DEFAULT_WAVEFORM_POINTS,
            capture: CaptureSettings::default(),
            gesture: GestureThresholds::default(),
            position_source: PositionSource::Clock,
        }
    }
}

impl SessionConfig {
    /// Get the default config path
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voxmemo")
            .join("config.json")
    }

    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load the config at `path` if it exists, defaults otherwise
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key, reason| Err(ConfigError::Invalid { key, reason });

        if self.duration_tick_ms == 0 {
            return invalid("duration_tick_ms", "must be greater than zero");
        }
        if self.amplitude_sample_ms == 0 {
            return invalid("amplitude_sample_ms", "must be greater than zero");
        }
        if self.playback_tick_ms == 0 {
            return invalid("playback_tick_ms", "must be greater than zero");
        }
        if self.live_amplitude_cap == 0 {
            return invalid("live_amplitude_cap", "must be greater than zero");
        }
        if self.waveform_points == 0 {
            return invalid("waveform_points", "must be greater than zero");
        }
        if self.capture.sample_rate == 0 {
            return invalid("capture.sample_rate", "must be greater than zero");
        }
        if self.capture.channels == 0 {
            return invalid("capture.channels", "must be greater than zero");
        }
        if self.gesture.cancel_threshold.is_nan() || self.gesture.cancel_threshold <= 0.0 {
            return invalid("gesture.cancel_threshold", "must be positive");
        }
        if self.gesture.lock_threshold.is_nan() || self.gesture.lock_threshold <= 0.0 {
            return invalid("gesture.lock_threshold", "must be positive");
        }
        Ok(())
    }

    pub fn duration_tick(&self) -> Duration {
        Duration::from_millis(self.duration_tick_ms)
    }

    pub fn amplitude_interval(&self) -> Duration {
        Duration::from_millis(self.amplitude_sample_ms)
    }

    pub fn playback_tick(&self) -> Duration {
        Duration::from_millis(self.playback_tick_ms)
    }
}
