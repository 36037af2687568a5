//! Application settings types
//!
//! The settings store itself is owned by the shell; the engine only
//! consumes the initial volume. These types define the persisted shape
//! and the normalization applied on every read/write.

use serde::{Deserialize, Serialize};

/// Clamp a value to [0, 1], mapping NaN to 0.
pub fn clamp01(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Persisted application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// Target playback volume in [0, 1]
    pub volume: f32,
    /// Re-select the last active mood on startup
    pub remember_last_mood: bool,
    /// Quit instead of hiding to tray when the window closes
    pub exit_on_close: bool,
    pub enable_global_hotkeys: bool,
    /// Start playback automatically when a mood is restored
    pub autoplay: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_mood_id: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            volume: 0.6,
            remember_last_mood: true,
            exit_on_close: false,
            enable_global_hotkeys: false,
            autoplay: false,
            last_mood_id: None,
        }
    }
}

impl AppSettings {
    /// Return a copy with all fields coerced into their valid ranges.
    pub fn normalized(&self) -> Self {
        let mut next = self.clone();
        next.volume = clamp01(next.volume);
        if let Some(id) = &next.last_mood_id {
            if id.trim().is_empty() {
                next.last_mood_id = None;
            }
        }
        next
    }
}
