//! Playback engine orchestration
//!
//! Owns the authoritative playback state and sequences every
//! transition: which backend is hot, fades around play/pause/switch,
//! source selection on mood changes, queue navigation, and
//! finish-driven auto-advance.
//!
//! Public operations never return errors. Every failure is caught
//! here, logged with its underlying cause, and published as
//! `status=error` with the generic user-facing message, so shell code
//! needs no error handling around engine calls. Overlapping intents
//! are not queued; the most recently committed state replacement wins
//! and the fade token is the only safeguard against audible overlap.

use std::sync::Arc;

use aura_common::error::SOURCE_UNAVAILABLE;
use aura_common::events::PlayerEvent;
use aura_common::{clamp01, AudioSource, Error, Result, SourceKind};
use chrono::Utc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::backend::{Backend, DirectStreamBackend, EmbeddedWidgetBackend, MediaHandle, WidgetHandle};
use crate::config::EngineConfig;
use crate::fade::FadeController;
use crate::provider::SourceProvider;
use crate::state::{PlaybackState, PlaybackStatus, SharedState};

/// Playback engine - single consistent state machine over two backends
pub struct PlaybackEngine {
    provider: Arc<dyn SourceProvider>,
    stream: Arc<dyn Backend>,
    widget: Arc<dyn Backend>,
    fade: Arc<FadeController>,
    state: Arc<SharedState>,
}

impl PlaybackEngine {
    /// Create an engine wired to the host's media element and embedded
    /// widget handles.
    pub fn new(
        provider: Arc<dyn SourceProvider>,
        media: Arc<dyn MediaHandle>,
        widget: Arc<dyn WidgetHandle>,
        config: EngineConfig,
    ) -> Self {
        let stream: Arc<dyn Backend> = Arc::new(DirectStreamBackend::new(media));
        let widget: Arc<dyn Backend> =
            Arc::new(EmbeddedWidgetBackend::new(widget, config.widget_load_timeout()));
        Self::with_backends(provider, stream, widget, config)
    }

    /// Create an engine over prebuilt backend adapters.
    pub fn with_backends(
        provider: Arc<dyn SourceProvider>,
        stream: Arc<dyn Backend>,
        widget: Arc<dyn Backend>,
        config: EngineConfig,
    ) -> Self {
        Self {
            provider,
            stream,
            widget,
            fade: Arc::new(FadeController::new(config.fade_duration(), config.fade_tick())),
            state: Arc::new(SharedState::new(clamp01(config.initial_volume))),
        }
    }

    /// Start background watchers for backend finish notifications.
    ///
    /// The widget's finish drives auto-advance through the queue; a
    /// direct stream ending parks the engine in `paused`.
    pub fn start(&self) {
        info!("starting playback engine watchers");

        let engine = self.clone_handles();
        let mut widget_finish = self.widget.on_finish();
        tokio::spawn(async move {
            loop {
                match widget_finish.recv().await {
                    Ok(()) => engine.on_widget_finished().await,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let engine = self.clone_handles();
        let mut stream_finish = self.stream.on_finish();
        tokio::spawn(async move {
            loop {
                match stream_finish.recv().await {
                    Ok(()) => engine.on_stream_finished().await,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    /// Synchronous snapshot of the current state.
    pub fn get_state(&self) -> PlaybackState {
        self.state.snapshot()
    }

    /// Subscribe to the state feed. The receiver holds the current
    /// state immediately and observes every replacement; dropping it
    /// unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state.subscribe()
    }

    /// Subscribe to discrete player events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<PlayerEvent> {
        self.state.subscribe_events()
    }

    /// Start playback of the bound source, fading in to the target
    /// volume.
    pub async fn play(&self) {
        let snapshot = self.state.snapshot();
        let Some(source) = snapshot.current_source else {
            self.publish_error("play requested without a bound source", None);
            return;
        };

        self.commit(|s| {
            s.status = PlaybackStatus::Loading;
            s.error = None;
        });

        let backend = Arc::clone(self.backend_for(source.kind));
        let result = async {
            backend.set_volume(0.0).await?;
            backend.play().await?;
            let target = self.state.snapshot().volume;
            self.fade.fade_to(backend.as_ref(), target).await
        }
        .await;

        match result {
            Ok(()) => {
                debug!(source_id = %source.id, "playback started");
                self.commit(|s| {
                    s.status = PlaybackStatus::Playing;
                    s.error = None;
                });
            }
            Err(e) => self.publish_error("failed to start playback", Some(&e)),
        }
    }

    /// Fade out and pause. No-op unless currently playing.
    pub async fn pause(&self) {
        let snapshot = self.state.snapshot();
        if snapshot.status != PlaybackStatus::Playing {
            return;
        }
        let Some(source) = snapshot.current_source else {
            return;
        };

        let backend = self.backend_for(source.kind);
        if let Err(e) = self.fade.fade_to(backend.as_ref(), 0.0).await {
            warn!("fade-out before pause failed: {}", e);
        }
        if let Err(e) = backend.pause().await {
            warn!("backend pause failed: {}", e);
        }
        // Restore the volume property so an unmediated resume is
        // already at the right level. Re-read the target: it may have
        // moved while the fade-out was running
        let target = self.state.snapshot().volume;
        if let Err(e) = backend.set_volume(target).await {
            warn!("volume restore after pause failed: {}", e);
        }

        self.commit(|s| s.status = PlaybackStatus::Paused);
    }

    /// Cancel any in-flight fade, halt the active backend, and return
    /// to idle.
    pub async fn stop(&self) {
        self.fade.cancel();

        let snapshot = self.state.snapshot();
        if let Some(source) = &snapshot.current_source {
            let backend = self.backend_for(source.kind);
            if let Err(e) = backend.stop().await {
                warn!("backend stop failed: {}", e);
            }
            if let Err(e) = backend.set_volume(snapshot.volume).await {
                warn!("volume restore after stop failed: {}", e);
            }
        }

        self.commit(|s| {
            s.status = PlaybackStatus::Idle;
            s.error = None;
        });
    }

    /// Set the target volume, applying it immediately (no fade) to the
    /// active backend while playing. Values are clamped to [0, 1].
    pub async fn set_volume(&self, value: f32) {
        let volume = clamp01(value);
        let snapshot = self.state.snapshot();

        if snapshot.status == PlaybackStatus::Playing {
            if let Some(source) = &snapshot.current_source {
                let backend = self.backend_for(source.kind);
                if let Err(e) = backend.set_volume(volume).await {
                    warn!("applying volume to backend failed: {}", e);
                }
            }
        }

        self.commit(|s| s.volume = volume);
        self.state.broadcast_event(PlayerEvent::VolumeChanged {
            volume,
            timestamp: Utc::now(),
        });
    }

    /// Switch to a mood: fade out if playing, resolve its sources,
    /// bind the preferred one, and resume if playback was active.
    pub async fn set_mood(&self, mood_id: &str) {
        let snapshot = self.state.snapshot();
        let was_playing = snapshot.status == PlaybackStatus::Playing;
        let previous = snapshot.current_source.clone();

        if was_playing {
            self.quiesce(previous.as_ref()).await;
        }

        self.commit(|s| {
            s.status = PlaybackStatus::Loading;
            s.current_mood_id = Some(mood_id.to_string());
            s.error = None;
        });
        self.state.broadcast_event(PlayerEvent::MoodSelected {
            mood_id: mood_id.to_string(),
            timestamp: Utc::now(),
        });

        let sources = self.provider.list_sources_for_mood(mood_id).await;
        if sources.is_empty() {
            warn!(mood_id, "mood resolved to an empty source list");
            self.commit(|s| {
                s.available_sources = Vec::new();
                s.current_source = None;
                s.current_track_index = None;
                s.queue_length = None;
                s.status = PlaybackStatus::Error;
                s.error = Some(SOURCE_UNAVAILABLE.to_string());
            });
            self.broadcast_error();
            return;
        }

        // Prefer the source already bound before the re-resolve so a
        // mood refresh keeps the current track
        let chosen = previous
            .as_ref()
            .and_then(|prev| sources.iter().find(|s| s.id == prev.id))
            .unwrap_or(&sources[0])
            .clone();

        match self.bind(previous.as_ref(), &chosen).await {
            Ok(()) => {
                let index = sources.iter().position(|s| s.id == chosen.id);
                let queue_len = sources.len();
                let embed = chosen.kind.is_embed();
                self.commit(|s| {
                    s.available_sources = sources.clone();
                    s.current_source = Some(chosen.clone());
                    s.current_track_index = if embed { index } else { None };
                    s.queue_length = if embed { Some(queue_len) } else { None };
                    s.status = PlaybackStatus::Paused;
                    s.error = None;
                });
                self.state.broadcast_event(PlayerEvent::SourceBound {
                    source: chosen,
                    timestamp: Utc::now(),
                });

                if was_playing {
                    self.play().await;
                }
            }
            Err(e) => {
                warn!(mood_id, "binding mood source failed: {}", e);
                self.commit(|s| {
                    s.available_sources = Vec::new();
                    s.current_source = None;
                    s.current_track_index = None;
                    s.queue_length = None;
                    s.status = PlaybackStatus::Error;
                    s.error = Some(SOURCE_UNAVAILABLE.to_string());
                });
                self.broadcast_error();
            }
        }
    }

    /// Bind an explicit source (queue navigation), resuming playback
    /// if it was active.
    pub async fn set_source(&self, source: AudioSource) {
        let snapshot = self.state.snapshot();
        let was_playing = snapshot.status == PlaybackStatus::Playing;
        let previous = snapshot.current_source.clone();

        if was_playing {
            self.quiesce(previous.as_ref()).await;
        }

        self.commit(|s| {
            s.status = PlaybackStatus::Loading;
            s.error = None;
        });

        match self.bind(previous.as_ref(), &source).await {
            Ok(()) => {
                let embed = source.kind.is_embed();
                self.commit(|s| {
                    s.current_track_index = if embed {
                        s.available_sources.iter().position(|x| x.id == source.id)
                    } else {
                        None
                    };
                    s.queue_length = if embed && !s.available_sources.is_empty() {
                        Some(s.available_sources.len())
                    } else {
                        None
                    };
                    s.current_source = Some(source.clone());
                    s.status = PlaybackStatus::Paused;
                    s.error = None;
                });
                self.state.broadcast_event(PlayerEvent::SourceBound {
                    source,
                    timestamp: Utc::now(),
                });

                if was_playing {
                    self.play().await;
                }
            }
            Err(e) => self.publish_error("binding source failed", Some(&e)),
        }
    }

    /// Replay the last known target (source if present, else mood) and
    /// attempt playback again. Recovery is always user-initiated;
    /// there is no automatic retry.
    pub async fn retry(&self) {
        let snapshot = self.state.snapshot();

        if let Some(source) = snapshot.current_source {
            self.set_source(source).await;
            self.play().await;
        } else if let Some(mood_id) = snapshot.current_mood_id {
            self.set_mood(&mood_id).await;
            self.play().await;
        } else {
            self.publish_error("retry requested without a prior target", None);
        }
    }

    /// Advance to the next source in the queue, wrapping at the end.
    /// No-op unless the active source is an embed source.
    pub async fn next_source_in_queue(&self) {
        self.step_queue(1).await;
    }

    /// Step back to the previous source in the queue, wrapping at the
    /// start. No-op unless the active source is an embed source.
    pub async fn prev_source_in_queue(&self) {
        self.step_queue(-1).await;
    }

    async fn step_queue(&self, delta: i64) {
        let snapshot = self.state.snapshot();
        let Some(current) = &snapshot.current_source else {
            return;
        };
        if !current.kind.is_embed() || snapshot.available_sources.is_empty() {
            return;
        }

        let len = snapshot.available_sources.len() as i64;
        let index = snapshot.current_track_index.unwrap_or(0) as i64;
        let next_index = (index + delta).rem_euclid(len) as usize;
        let next = snapshot.available_sources[next_index].clone();

        debug!(from = index, to = next_index, "queue navigation");
        self.set_source(next).await;
    }

    /// Widget finish: auto-advance through the queue.
    async fn on_widget_finished(&self) {
        let snapshot = self.state.snapshot();
        let source_id = snapshot.current_source.as_ref().map(|s| s.id.clone());
        self.state.broadcast_event(PlayerEvent::TrackFinished {
            source_id,
            timestamp: Utc::now(),
        });

        let is_embed = snapshot
            .current_source
            .as_ref()
            .map(|s| s.kind.is_embed())
            .unwrap_or(false);
        if is_embed {
            self.next_source_in_queue().await;
        }
    }

    /// Direct stream ended: park in paused.
    async fn on_stream_finished(&self) {
        let snapshot = self.state.snapshot();
        // Only a playing stream can audibly end; late element
        // notifications in any other state are stale
        if snapshot.status != PlaybackStatus::Playing {
            return;
        }
        match &snapshot.current_source {
            Some(source) if !source.kind.is_embed() => {
                self.state.broadcast_event(PlayerEvent::TrackFinished {
                    source_id: Some(source.id.clone()),
                    timestamp: Utc::now(),
                });
                self.commit(|s| s.status = PlaybackStatus::Paused);
            }
            _ => {}
        }
    }

    fn backend_for(&self, kind: SourceKind) -> &Arc<dyn Backend> {
        match kind {
            SourceKind::Embed => &self.widget,
            SourceKind::Stream | SourceKind::Local => &self.stream,
        }
    }

    /// Fade out and pause the backend currently producing audio.
    async fn quiesce(&self, current: Option<&AudioSource>) {
        let Some(source) = current else { return };
        let backend = self.backend_for(source.kind);
        if let Err(e) = self.fade.fade_to(backend.as_ref(), 0.0).await {
            warn!("fade-out before transition failed: {}", e);
        }
        if let Err(e) = backend.pause().await {
            warn!("pausing outgoing backend failed: {}", e);
        }
    }

    /// Bind `next` to its backend. When the hot backend changes, the
    /// outgoing one is paused and zeroed first so the two are never
    /// heard simultaneously.
    async fn bind(&self, previous: Option<&AudioSource>, next: &AudioSource) -> Result<()> {
        if let Some(prev) = previous {
            if prev.kind.is_embed() != next.kind.is_embed() {
                let outgoing = self.backend_for(prev.kind);
                outgoing.pause().await?;
                outgoing.set_volume(0.0).await?;
            }
        }
        self.backend_for(next.kind).bind(next).await
    }

    /// Replace the state record, emitting a status event on change.
    fn commit(&self, apply: impl FnOnce(&mut PlaybackState)) -> PlaybackState {
        let before = self.state.snapshot().status;
        let next = self.state.update(apply);
        if next.status != before {
            self.state.broadcast_event(PlayerEvent::StatusChanged {
                status: next.status.as_str().to_string(),
                timestamp: Utc::now(),
            });
        }
        next
    }

    /// Normalize any failure into the single user-facing error state.
    fn publish_error(&self, context: &str, cause: Option<&Error>) {
        let message = match cause {
            Some(e) => {
                warn!("{}: {}", context, e);
                e.user_message()
            }
            None => {
                warn!("{}", context);
                SOURCE_UNAVAILABLE
            }
        };
        self.commit(|s| {
            s.status = PlaybackStatus::Error;
            s.error = Some(message.to_string());
        });
        self.broadcast_error();
    }

    fn broadcast_error(&self) {
        self.state.broadcast_event(PlayerEvent::PlaybackError {
            message: SOURCE_UNAVAILABLE.to_string(),
            timestamp: Utc::now(),
        });
    }

    /// Clone handles for spawned watcher tasks.
    fn clone_handles(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            stream: Arc::clone(&self.stream),
            widget: Arc::clone(&self.widget),
            fade: Arc::clone(&self.fade),
            state: Arc::clone(&self.state),
        }
    }
}
