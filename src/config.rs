//! Runtime configuration.
//!
//! Defaults are compiled in. With the `config` feature enabled a TOML file can override them,
//! either from an explicit path or from `<config dir>/canvas-pacer/config.toml`:
//!
//! ```toml
//! intervals_ms = [47, 53, 43, 59]
//! tick_hz = 60
//! input_poll_ms = 50
//! theme = "high-contrast"
//! ```
//!
//! Command-line flags are applied on top by the binary.

use crate::error::{PacerError, Result};
use crate::pacing::{IntervalRotation, DEFAULT_INTERVALS_MS};
use crate::sim::{MAX_TICK_HZ, MIN_TICK_HZ};
use std::time::Duration;

#[cfg(feature = "config")]
use std::path::{Path, PathBuf};

/// Named color themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "config",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "kebab-case")
)]
pub enum ThemeName {
    #[default]
    Default,
    Monochrome,
    HighContrast,
}

/// All tunables of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "config",
    derive(serde::Deserialize, serde::Serialize),
    serde(default, deny_unknown_fields)
)]
pub struct PacerConfig {
    /// Repaint interval rotation in milliseconds
    pub intervals_ms: Vec<u64>,

    /// Initial simulation tick rate
    pub tick_hz: u32,

    /// How long the input thread waits per poll
    pub input_poll_ms: u64,

    pub theme: ThemeName,
}

impl Default for PacerConfig {
    fn default() -> Self {
        Self {
            intervals_ms: DEFAULT_INTERVALS_MS.to_vec(),
            tick_hz: 60,
            input_poll_ms: 50,
            theme: ThemeName::Default,
        }
    }
}

impl PacerConfig {
    /// Check every field is within its supported range.
    pub fn validate(&self) -> Result<()> {
        if self.intervals_ms.is_empty() {
            return Err(PacerError::config("intervals_ms must not be empty"));
        }
        if self.intervals_ms.contains(&0) {
            return Err(PacerError::config("intervals_ms entries must be positive"));
        }
        if !(MIN_TICK_HZ..=MAX_TICK_HZ).contains(&self.tick_hz) {
            return Err(PacerError::config(format!(
                "tick_hz must be between {MIN_TICK_HZ} and {MAX_TICK_HZ}, got {}",
                self.tick_hz
            )));
        }
        if self.input_poll_ms == 0 {
            return Err(PacerError::config("input_poll_ms must be positive"));
        }
        Ok(())
    }

    /// Pin the repaint interval to a single value.
    pub fn with_fixed_interval(mut self, interval_ms: u64) -> Self {
        self.intervals_ms = vec![interval_ms];
        self
    }

    pub fn with_tick_hz(mut self, tick_hz: u32) -> Self {
        self.tick_hz = tick_hz;
        self
    }

    /// Build the interval rotation described by this config.
    pub fn rotation(&self) -> Result<IntervalRotation> {
        IntervalRotation::from_millis(&self.intervals_ms)
    }

    pub fn input_poll_interval(&self) -> Duration {
        Duration::from_millis(self.input_poll_ms)
    }

    /// Parse and validate a TOML document.
    #[cfg(feature = "config")]
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)
            .map_err(|e| PacerError::config(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    #[cfg(feature = "config")]
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            PacerError::io(format!("Failed to read config: {}", path.display()), e)
        })?;
        Self::from_toml_str(&source)
    }

    /// Default config file location, if the platform has a config directory.
    #[cfg(feature = "config")]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("canvas-pacer").join("config.toml"))
    }

    /// Load the default config file, falling back to built-in defaults when it does not exist.
    #[cfg(feature = "config")]
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }
}
