//! Embedded-widget backend
//!
//! Drives a sandboxed third-party player that is reachable only
//! through an event-driven handle: commands go down, ready/finish/
//! error notifications come back asynchronously. This adapter
//! provisions the widget lazily exactly once, serializes track loads
//! so callers await completion or failure, bounds the load wait, and
//! translates between the engine's [0,1] volume scale and the widget's
//! 0-100 integer scale.

use async_trait::async_trait;
use aura_common::{clamp01, AudioSource, Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex, OnceCell, RwLock};
use tracing::{debug, warn};

use super::Backend;

/// Notifications from the embedded widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetEvent {
    /// The widget finished initializing
    Ready,
    /// The most recent load request completed
    LoadComplete,
    /// The current track finished playing
    Finished,
    /// The widget reported a playback or load failure
    Failed,
}

/// Host-provided control surface for the embedded player
#[async_trait]
pub trait WidgetHandle: Send + Sync {
    /// Create and attach the underlying widget. Called at most once
    /// per process by the adapter.
    async fn provision(&self) -> Result<()>;

    /// Request a track load. Completion is signaled via
    /// [`WidgetEvent::LoadComplete`] or [`WidgetEvent::Failed`].
    async fn load(&self, uri: &str) -> Result<()>;

    async fn play(&self) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    /// Set volume on the widget's native 0-100 integer scale.
    async fn set_volume(&self, percent: u8) -> Result<()>;

    /// Subscribe to widget notifications.
    fn events(&self) -> broadcast::Receiver<WidgetEvent>;
}

/// Backend adapter for `embed` sources
pub struct EmbeddedWidgetBackend {
    handle: Arc<dyn WidgetHandle>,
    provisioned: OnceCell<()>,
    /// One load in flight at a time; later binds queue behind it
    load_lock: Mutex<()>,
    load_timeout: Duration,
    volume: RwLock<f32>,
    finish_tx: broadcast::Sender<()>,
}

impl EmbeddedWidgetBackend {
    pub fn new(handle: Arc<dyn WidgetHandle>, load_timeout: Duration) -> Self {
        let (finish_tx, _) = broadcast::channel(16);

        // Forward widget finish notifications to engine subscribers
        let mut events = handle.events();
        let forward_tx = finish_tx.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(WidgetEvent::Finished) => {
                        let _ = forward_tx.send(());
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!("widget event stream lagged, skipped {}", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Self {
            handle,
            provisioned: OnceCell::new(),
            load_lock: Mutex::new(()),
            load_timeout,
            volume: RwLock::new(0.0),
            finish_tx,
        }
    }

    async fn ensure_provisioned(&self) -> Result<()> {
        self.provisioned
            .get_or_try_init(|| async {
                debug!("provisioning embedded widget");
                self.handle.provision().await
            })
            .await?;
        Ok(())
    }

    fn to_percent(volume: f32) -> u8 {
        (clamp01(volume) * 100.0).round() as u8
    }

    /// Wait for the outcome of an issued load request.
    async fn await_load_outcome(&self, events: &mut broadcast::Receiver<WidgetEvent>) -> Result<()> {
        loop {
            match events.recv().await {
                Ok(WidgetEvent::LoadComplete) => return Ok(()),
                Ok(WidgetEvent::Failed) => return Err(Error::SourceUnavailable),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(Error::Backend("widget event channel closed".into()))
                }
            }
        }
    }
}

#[async_trait]
impl Backend for EmbeddedWidgetBackend {
    async fn bind(&self, source: &AudioSource) -> Result<()> {
        self.ensure_provisioned().await?;

        let _guard = self.load_lock.lock().await;
        debug!(source_id = %source.id, uri = %source.uri, "loading embedded track");

        // Subscribe before issuing the load so the outcome cannot slip
        // between the command and the wait
        let mut events = self.handle.events();
        self.handle.load(&source.uri).await?;

        match tokio::time::timeout(self.load_timeout, self.await_load_outcome(&mut events)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(uri = %source.uri, "widget load timed out");
                Err(Error::Timeout("widget load".into()))
            }
        }
    }

    async fn play(&self) -> Result<()> {
        self.ensure_provisioned().await?;
        self.handle.play().await
    }

    async fn pause(&self) -> Result<()> {
        // Nothing to pause before the widget exists
        if self.provisioned.get().is_none() {
            return Ok(());
        }
        self.handle.pause().await
    }

    async fn stop(&self) -> Result<()> {
        // The widget offers no rewind; stop degrades to pause
        self.pause().await
    }

    async fn set_volume(&self, volume: f32) -> Result<()> {
        let volume = clamp01(volume);
        *self.volume.write().await = volume;

        if self.provisioned.get().is_none() {
            return Ok(());
        }
        self.handle.set_volume(Self::to_percent(volume)).await
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
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeWidget {
        provision_count: AtomicUsize,
        loaded: Mutex<Vec<String>>,
        volume_pct: Mutex<Option<u8>>,
        paused: Mutex<bool>,
        /// When true, `load` emits `LoadComplete` immediately
        complete_loads: bool,
        /// When true, `load` emits `Failed` immediately
        fail_loads: bool,
        events_tx: broadcast::Sender<WidgetEvent>,
    }

    impl FakeWidget {
        fn new(complete_loads: bool) -> Self {
            let (events_tx, _) = broadcast::channel(16);
            Self {
                provision_count: AtomicUsize::new(0),
                loaded: Mutex::new(Vec::new()),
                volume_pct: Mutex::new(None),
                paused: Mutex::new(false),
                complete_loads,
                fail_loads: false,
                events_tx,
            }
        }
    }

    #[async_trait]
    impl WidgetHandle for FakeWidget {
        async fn provision(&self) -> Result<()> {
            self.provision_count.fetch_add(1, Ordering::SeqCst);
            let _ = self.events_tx.send(WidgetEvent::Ready);
            Ok(())
        }

        async fn load(&self, uri: &str) -> Result<()> {
            self.loaded.lock().await.push(uri.to_string());
            if self.fail_loads {
                let _ = self.events_tx.send(WidgetEvent::Failed);
            } else if self.complete_loads {
                let _ = self.events_tx.send(WidgetEvent::LoadComplete);
            }
            Ok(())
        }

        async fn play(&self) -> Result<()> {
            *self.paused.lock().await = false;
            Ok(())
        }

        async fn pause(&self) -> Result<()> {
            *self.paused.lock().await = true;
            Ok(())
        }

        async fn set_volume(&self, percent: u8) -> Result<()> {
            *self.volume_pct.lock().await = Some(percent);
            Ok(())
        }

        fn events(&self) -> broadcast::Receiver<WidgetEvent> {
            self.events_tx.subscribe()
        }
    }

    fn embed_source(uri: &str) -> AudioSource {
        AudioSource {
            id: "focus-station-1".into(),
            label: "Idea 22".into(),
            kind: aura_common::SourceKind::Embed,
            uri: uri.into(),
        }
    }

    #[tokio::test]
    async fn test_provisions_exactly_once() {
        let widget = Arc::new(FakeWidget::new(true));
        let backend = EmbeddedWidgetBackend::new(widget.clone(), Duration::from_secs(15));

        backend.bind(&embed_source("https://sc.example/a")).await.unwrap();
        backend.bind(&embed_source("https://sc.example/b")).await.unwrap();
        backend.play().await.unwrap();

        assert_eq!(widget.provision_count.load(Ordering::SeqCst), 1);
        assert_eq!(widget.loaded.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_load_failure_is_source_unavailable() {
        let mut widget = FakeWidget::new(false);
        widget.fail_loads = true;
        let backend = EmbeddedWidgetBackend::new(Arc::new(widget), Duration::from_secs(15));

        let err = backend
            .bind(&embed_source("https://sc.example/broken"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable));
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_times_out() {
        // Widget never signals completion
        let widget = Arc::new(FakeWidget::new(false));
        let backend = EmbeddedWidgetBackend::new(widget, Duration::from_secs(15));

        let err = backend
            .bind(&embed_source("https://sc.example/silent"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
    }

    #[tokio::test]
    async fn test_volume_scale_translation() {
        let widget = Arc::new(FakeWidget::new(true));
        let backend = EmbeddedWidgetBackend::new(widget.clone(), Duration::from_secs(15));
        backend.bind(&embed_source("https://sc.example/a")).await.unwrap();

        backend.set_volume(0.67).await.unwrap();
        assert_eq!(*widget.volume_pct.lock().await, Some(67));
        assert_eq!(backend.volume().await, 0.67);

        // Rounds to the nearest integer percent
        backend.set_volume(0.008).await.unwrap();
        assert_eq!(*widget.volume_pct.lock().await, Some(1));

        backend.set_volume(1.9).await.unwrap();
        assert_eq!(*widget.volume_pct.lock().await, Some(100));
    }

    #[tokio::test]
    async fn test_pause_and_volume_noop_before_provisioning() {
        let widget = Arc::new(FakeWidget::new(true));
        let backend = EmbeddedWidgetBackend::new(widget.clone(), Duration::from_secs(15));

        backend.pause().await.unwrap();
        backend.set_volume(0.5).await.unwrap();

        assert_eq!(widget.provision_count.load(Ordering::SeqCst), 0);
        assert_eq!(*widget.volume_pct.lock().await, None);
        // Target is still remembered for after provisioning
        assert_eq!(backend.volume().await, 0.5);
    }

    #[tokio::test]
    async fn test_finish_fan_out() {
        let widget = Arc::new(FakeWidget::new(true));
        let backend = EmbeddedWidgetBackend::new(widget.clone(), Duration::from_secs(15));

        let mut first = backend.on_finish();
        let mut second = backend.on_finish();

        widget.events_tx.send(WidgetEvent::Finished).unwrap();

        first.recv().await.unwrap();
        second.recv().await.unwrap();
    }
}
