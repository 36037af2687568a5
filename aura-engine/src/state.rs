//! Shared playback state
//!
//! The engine owns a single `PlaybackState` record. Every change
//! replaces the record wholesale through a watch channel, so
//! subscribers always observe a complete, immutable snapshot and a new
//! subscriber sees the current state immediately. Discrete
//! notifications additionally go out on a broadcast channel.

use aura_common::events::PlayerEvent;
use aura_common::AudioSource;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};

/// Playback status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    Idle,
    Loading,
    Playing,
    Paused,
    Error,
}

impl PlaybackStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PlaybackStatus::Idle => "idle",
            PlaybackStatus::Loading => "loading",
            PlaybackStatus::Playing => "playing",
            PlaybackStatus::Paused => "paused",
            PlaybackStatus::Error => "error",
        }
    }
}

/// The single authoritative playback state record
///
/// `error` is `Some` iff `status == Error`. `current_track_index` and
/// `queue_length` are populated only while the bound source is an
/// embed source; queue navigation is meaningless for single-stream
/// moods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_mood_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_source: Option<AudioSource>,
    pub available_sources: Vec<AudioSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_track_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_length: Option<usize>,
    /// User-intended target volume in [0, 1]; decoupled from the
    /// instantaneous (possibly mid-fade) backend volume
    pub volume: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PlaybackState {
    /// Initial state at engine construction.
    pub fn new(initial_volume: f32) -> Self {
        Self {
            status: PlaybackStatus::Idle,
            current_mood_id: None,
            current_source: None,
            available_sources: Vec::new(),
            current_track_index: None,
            queue_length: None,
            volume: initial_volume,
            error: None,
        }
    }
}

/// Shared state handle: watch channel for full-state snapshots plus a
/// broadcast channel for discrete events.
pub struct SharedState {
    state_tx: watch::Sender<PlaybackState>,
    event_tx: broadcast::Sender<PlayerEvent>,
}

impl SharedState {
    pub fn new(initial_volume: f32) -> Self {
        let (state_tx, _) = watch::channel(PlaybackState::new(initial_volume));
        let (event_tx, _) = broadcast::channel(64);
        Self { state_tx, event_tx }
    }

    /// Synchronous snapshot of the current state.
    pub fn snapshot(&self) -> PlaybackState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to the state feed.
    ///
    /// The receiver holds the current state immediately and observes
    /// every subsequent replacement. Dropping the receiver
    /// unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state_tx.subscribe()
    }

    /// Subscribe to discrete player events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<PlayerEvent> {
        self.event_tx.subscribe()
    }

    /// Broadcast an event to all listeners.
    pub fn broadcast_event(&self, event: PlayerEvent) {
        // No receivers is fine
        let _ = self.event_tx.send(event);
    }

    /// Replace the state record.
    ///
    /// Clones the current record, applies `apply`, and publishes the
    /// result wholesale. Callers mutate only the fields their intent
    /// covers; nothing is ever patched in place under a subscriber.
    pub fn update(&self, apply: impl FnOnce(&mut PlaybackState)) -> PlaybackState {
        let mut next = self.state_tx.borrow().clone();
        apply(&mut next);
        debug_assert!(
            (next.status == PlaybackStatus::Error)
                == next.error.as_deref().map(|e| !e.is_empty()).unwrap_or(false),
            "error message must be present exactly when status is error"
        );
        self.state_tx.send_replace(next.clone());
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_common::SourceKind;

    fn source(id: &str) -> AudioSource {
        AudioSource {
            id: id.into(),
            label: id.into(),
            kind: SourceKind::Stream,
            uri: format!("https://example.com/{id}"),
        }
    }

    #[test]
    fn test_initial_state() {
        let state = PlaybackState::new(0.6);
        assert_eq!(state.status, PlaybackStatus::Idle);
        assert!(state.current_source.is_none());
        assert!(state.available_sources.is_empty());
        assert_eq!(state.volume, 0.6);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_update_replaces_record() {
        let shared = SharedState::new(0.6);
        let mut rx = shared.subscribe();

        // New subscriber sees the current state immediately
        assert_eq!(rx.borrow().status, PlaybackStatus::Idle);

        shared.update(|s| {
            s.status = PlaybackStatus::Loading;
            s.current_mood_id = Some("jazz".into());
        });

        assert!(rx.has_changed().unwrap());
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.status, PlaybackStatus::Loading);
        assert_eq!(seen.current_mood_id.as_deref(), Some("jazz"));
        // Untouched fields carried over
        assert_eq!(seen.volume, 0.6);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let shared = SharedState::new(0.5);
        let before = shared.snapshot();
        shared.update(|s| s.volume = 0.9);

        assert_eq!(before.volume, 0.5);
        assert_eq!(shared.snapshot().volume, 0.9);
    }

    #[test]
    fn test_last_write_wins() {
        let shared = SharedState::new(0.6);
        shared.update(|s| s.current_source = Some(source("a")));
        shared.update(|s| s.current_source = Some(source("b")));

        let current = shared.snapshot();
        assert_eq!(current.current_source.unwrap().id, "b");
    }

    #[tokio::test]
    async fn test_event_broadcast() {
        let shared = SharedState::new(0.6);
        let mut rx = shared.subscribe_events();

        shared.broadcast_event(PlayerEvent::VolumeChanged {
            volume: 0.3,
            timestamp: chrono::Utc::now(),
        });

        match rx.recv().await.unwrap() {
            PlayerEvent::VolumeChanged { volume, .. } => assert_eq!(volume, 0.3),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_state_serialization_omits_empty_fields() {
        let state = PlaybackState::new(0.6);
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"status\":\"idle\""));
        assert!(!json.contains("error"));
        assert!(!json.contains("currentSource"));
    }
}
