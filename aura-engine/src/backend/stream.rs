//! Direct-stream backend
//!
//! Drives playback of network/local audio URIs through the host's
//! media subsystem. The host exposes its media element as a
//! [`MediaHandle`]; this adapter layers the binding rules on top:
//! local files wait for the playable signal, network streams are
//! considered bound immediately (their readiness cannot be probed
//! without buffering).

use async_trait::async_trait;
use aura_common::{clamp01, AudioSource, Result, SourceKind};
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::Backend;

/// Notifications from the host media element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    /// Playback reached the end of the source
    Ended,
    /// The element failed mid-playback
    Failed,
}

/// Host-provided control surface for the native media element
///
/// Implementations should avoid pre-buffering a bound source until
/// playback is requested, so unselected moods cost no bandwidth.
#[async_trait]
pub trait MediaHandle: Send + Sync {
    /// Point the element at a new URI, resetting its position.
    async fn set_source(&self, uri: &str) -> Result<()>;

    /// Resolve once the element can begin playback of the current
    /// source without stalling.
    async fn wait_until_playable(&self) -> Result<()>;

    async fn play(&self) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    /// Seek back to the start of the current source.
    async fn rewind(&self) -> Result<()>;

    async fn set_volume(&self, volume: f32) -> Result<()>;

    /// Subscribe to element notifications.
    fn events(&self) -> broadcast::Receiver<MediaEvent>;
}

/// Backend adapter for `stream` and `local` sources
pub struct DirectStreamBackend {
    handle: std::sync::Arc<dyn MediaHandle>,
    volume: RwLock<f32>,
    finish_tx: broadcast::Sender<()>,
}

impl DirectStreamBackend {
    pub fn new(handle: std::sync::Arc<dyn MediaHandle>) -> Self {
        let (finish_tx, _) = broadcast::channel(16);

        // Forward element "ended" notifications as finish events
        let mut events = handle.events();
        let forward_tx = finish_tx.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(MediaEvent::Ended) => {
                        let _ = forward_tx.send(());
                    }
                    Ok(MediaEvent::Failed) => {
                        debug!("media element reported failure outside an operation");
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!("media event stream lagged, skipped {}", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Self {
            handle,
            volume: RwLock::new(0.0),
            finish_tx,
        }
    }
}

#[async_trait]
impl Backend for DirectStreamBackend {
    async fn bind(&self, source: &AudioSource) -> Result<()> {
        debug!(source_id = %source.id, uri = %source.uri, "binding direct-stream source");
        self.handle.set_source(&source.uri).await?;

        // Only local files expose a reliable readiness signal
        if source.kind == SourceKind::Local {
            self.handle.wait_until_playable().await?;
        }

        Ok(())
    }

    async fn play(&self) -> Result<()> {
        self.handle.play().await
    }

    async fn pause(&self) -> Result<()> {
        self.handle.pause().await
    }

    async fn stop(&self) -> Result<()> {
        self.handle.pause().await?;
        self.handle.rewind().await
    }

    async fn set_volume(&self, volume: f32) -> Result<()> {
        let volume = clamp01(volume);
        self.handle.set_volume(volume).await?;
        *self.volume.write().await = volume;
        Ok(())
    }

    async fn volume(&self) -> f32 {
        *self.volume.read().await
    }

    fn on_finish(&self) -> broadcast::Receiver<()> {
        self.finish_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_common::Error;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct HandleLog {
        uri: Option<String>,
        waited_for_playable: bool,
        playing: bool,
        position_reset: bool,
        volume: f32,
    }

    struct FakeHandle {
        log: Mutex<HandleLog>,
        fail_playable: bool,
        events_tx: broadcast::Sender<MediaEvent>,
    }

    impl FakeHandle {
        fn new() -> Self {
            let (events_tx, _) = broadcast::channel(16);
            Self {
                log: Mutex::new(HandleLog::default()),
                fail_playable: false,
                events_tx,
            }
        }
    }

    #[async_trait]
    impl MediaHandle for FakeHandle {
        async fn set_source(&self, uri: &str) -> Result<()> {
            let mut log = self.log.lock().await;
            log.uri = Some(uri.to_string());
            log.position_reset = true;
            Ok(())
        }

        async fn wait_until_playable(&self) -> Result<()> {
            if self.fail_playable {
                return Err(Error::Backend("decode failed".into()));
            }
            self.log.lock().await.waited_for_playable = true;
            Ok(())
        }

        async fn play(&self) -> Result<()> {
            self.log.lock().await.playing = true;
            Ok(())
        }

        async fn pause(&self) -> Result<()> {
            self.log.lock().await.playing = false;
            Ok(())
        }

        async fn rewind(&self) -> Result<()> {
            self.log.lock().await.position_reset = true;
            Ok(())
        }

        async fn set_volume(&self, volume: f32) -> Result<()> {
            self.log.lock().await.volume = volume;
            Ok(())
        }

        fn events(&self) -> broadcast::Receiver<MediaEvent> {
            self.events_tx.subscribe()
        }
    }

    fn source(kind: SourceKind) -> AudioSource {
        AudioSource {
            id: "s1".into(),
            label: "Test".into(),
            kind,
            uri: "https://example.com/audio".into(),
        }
    }

    #[tokio::test]
    async fn test_stream_binds_without_waiting() {
        let handle = Arc::new(FakeHandle::new());
        let backend = DirectStreamBackend::new(handle.clone());

        backend.bind(&source(SourceKind::Stream)).await.unwrap();

        let log = handle.log.lock().await;
        assert_eq!(log.uri.as_deref(), Some("https://example.com/audio"));
        assert!(!log.waited_for_playable);
    }

    #[tokio::test]
    async fn test_local_waits_for_playable() {
        let handle = Arc::new(FakeHandle::new());
        let backend = DirectStreamBackend::new(handle.clone());

        backend.bind(&source(SourceKind::Local)).await.unwrap();

        assert!(handle.log.lock().await.waited_for_playable);
    }

    #[tokio::test]
    async fn test_local_bind_fails_when_not_playable() {
        let mut handle = FakeHandle::new();
        handle.fail_playable = true;
        let backend = DirectStreamBackend::new(Arc::new(handle));

        assert!(backend.bind(&source(SourceKind::Local)).await.is_err());
    }

    #[tokio::test]
    async fn test_stop_pauses_and_rewinds() {
        let handle = Arc::new(FakeHandle::new());
        let backend = DirectStreamBackend::new(handle.clone());

        backend.play().await.unwrap();
        backend.stop().await.unwrap();

        let log = handle.log.lock().await;
        assert!(!log.playing);
        assert!(log.position_reset);
    }

    #[tokio::test]
    async fn test_set_volume_is_clamped_and_cached() {
        let handle = Arc::new(FakeHandle::new());
        let backend = DirectStreamBackend::new(handle.clone());

        backend.set_volume(1.4).await.unwrap();
        assert_eq!(backend.volume().await, 1.0);
        assert_eq!(handle.log.lock().await.volume, 1.0);
    }

    #[tokio::test]
    async fn test_ended_event_surfaces_as_finish() {
        let handle = Arc::new(FakeHandle::new());
        let backend = DirectStreamBackend::new(handle.clone());
        let mut finish = backend.on_finish();

        handle.events_tx.send(MediaEvent::Ended).unwrap();

        finish.recv().await.unwrap();
    }
}
