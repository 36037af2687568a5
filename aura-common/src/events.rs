//! Event types for the Aura player
//!
//! Discrete notifications broadcast by the playback engine alongside
//! its state feed. Subscribers that only care about the full state can
//! ignore these; the tray and OS "now playing" integrations key off
//! individual events instead of diffing snapshots.

use crate::source::AudioSource;
use serde::{Deserialize, Serialize};

/// Player event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// Playback status changed (idle/loading/playing/paused/error)
    StatusChanged {
        status: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// User-intended target volume changed
    VolumeChanged {
        volume: f32,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A mood was selected (sources may not be resolved yet)
    MoodSelected {
        mood_id: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A source was bound to a backend
    SourceBound {
        source: AudioSource,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The active source finished on its own (not user-initiated)
    TrackFinished {
        source_id: Option<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playback failed; `message` is the user-facing description
    PlaybackError {
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}
