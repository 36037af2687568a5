//! Engine configuration
//!
//! Bootstrap configuration loaded from TOML (or built from defaults by
//! the shell). All values are static for the process lifetime; the
//! target volume is runtime state and lives in `PlaybackState`, seeded
//! from the settings store.

use aura_common::{clamp01, Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

fn default_fade_duration_ms() -> u64 {
    700
}

fn default_fade_tick_ms() -> u64 {
    16 // one animation frame at ~60 Hz
}

fn default_widget_load_timeout_ms() -> u64 {
    15_000
}

fn default_initial_volume() -> f32 {
    0.6
}

/// Engine bootstrap configuration
///
/// Every field has a built-in default, so an empty TOML table (or
/// `EngineConfig::default()`) yields a working configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Volume ramp duration for every transition fade
    pub fade_duration_ms: u64,

    /// Interval between fade volume updates
    pub fade_tick_ms: u64,

    /// Bounded wait for the embedded widget to finish loading a track
    pub widget_load_timeout_ms: u64,

    /// Initial target volume in [0, 1], normally supplied by the
    /// settings store
    pub initial_volume: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fade_duration_ms: default_fade_duration_ms(),
            fade_tick_ms: default_fade_tick_ms(),
            widget_load_timeout_ms: default_widget_load_timeout_ms(),
            initial_volume: default_initial_volume(),
        }
    }
}

impl EngineConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(input)
            .map_err(|e| Error::Config(format!("failed to parse TOML: {}", e)))?;
        Ok(config.validated())
    }

    /// Load configuration from a TOML file.
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        Self::from_toml_str(&contents)
    }

    /// Clamp out-of-range values instead of rejecting them.
    fn validated(mut self) -> Self {
        self.initial_volume = clamp01(self.initial_volume);
        if self.fade_tick_ms == 0 {
            self.fade_tick_ms = default_fade_tick_ms();
        }
        self
    }

    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_duration_ms)
    }

    pub fn fade_tick(&self) -> Duration {
        Duration::from_millis(self.fade_tick_ms)
    }

    pub fn widget_load_timeout(&self) -> Duration {
        Duration::from_millis(self.widget_load_timeout_ms)
    }
}
