//! Playback backends
//!
//! Exactly one backend is "hot" at a time, selected by the bound
//! source's kind. The engine talks to both through the [`Backend`]
//! trait so transition choreography (fades, pause/zero on switch) is
//! written once.

pub mod stream;
pub mod widget;

use async_trait::async_trait;
use aura_common::{AudioSource, Result};
use tokio::sync::broadcast;

pub use stream::{DirectStreamBackend, MediaEvent, MediaHandle};
pub use widget::{EmbeddedWidgetBackend, WidgetEvent, WidgetHandle};

/// Common capability set of the two playback backends
#[async_trait]
pub trait Backend: Send + Sync {
    /// Bind a source without starting playback.
    ///
    /// Returns once the source is considered bound: immediately for
    /// network streams, after the playable signal for local files,
    /// after load completion (or timeout) for embedded tracks.
    async fn bind(&self, source: &AudioSource) -> Result<()>;

    /// Start or resume playback of the bound source.
    async fn play(&self) -> Result<()>;

    /// Pause playback, keeping the bound source and position.
    async fn pause(&self) -> Result<()>;

    /// Pause and rewind where the backend supports it.
    async fn stop(&self) -> Result<()>;

    /// Set the instantaneous output volume in [0, 1].
    async fn set_volume(&self, volume: f32) -> Result<()>;

    /// Last volume applied to this backend.
    async fn volume(&self) -> f32;

    /// Subscribe to finish notifications (the bound source ended on
    /// its own). Multiple subscribers allowed.
    fn on_finish(&self) -> broadcast::Receiver<()>;
}
