//! Volume fade control
//!
//! Every audible transition runs through a timed linear ramp between
//! the backend's current volume and a target level. Fades are
//! supersedable: each invocation is stamped with a monotonically
//! increasing token, starting a new fade bumps the token, and a running
//! fade checks its captured token on every tick and exits silently when
//! superseded. This is the only cancellation primitive in the engine.

use aura_common::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::trace;

use crate::backend::Backend;

/// Below this distance a ramp is pointless; the target is applied
/// directly (also avoids a floating-point stall near the endpoint).
const FADE_EPSILON: f32 = 0.001;

/// Drives time-based volume ramps against either backend
pub struct FadeController {
    /// Generation counter; the newest scheduled ramp wins
    token: AtomicU64,
    duration: Duration,
    tick: Duration,
}

impl FadeController {
    pub fn new(duration: Duration, tick: Duration) -> Self {
        Self {
            token: AtomicU64::new(0),
            duration,
            tick,
        }
    }

    /// Invalidate any in-flight fade without starting a new one.
    pub fn cancel(&self) {
        self.token.fetch_add(1, Ordering::SeqCst);
    }

    /// Ramp the backend's volume from its current level to `target`.
    ///
    /// Resolves when the ramp completes or when a newer fade (or
    /// [`cancel`](Self::cancel)) supersedes it; supersession is not an
    /// error. Only backend volume failures propagate.
    pub async fn fade_to(&self, backend: &dyn Backend, target: f32) -> Result<()> {
        let token = self.token.fetch_add(1, Ordering::SeqCst) + 1;
        let start = backend.volume().await;
        let target = target.clamp(0.0, 1.0);

        if (start - target).abs() < FADE_EPSILON {
            backend.set_volume(target).await?;
            return Ok(());
        }

        let started_at = Instant::now();
        let mut ticker = interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick of tokio's interval completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            if self.token.load(Ordering::SeqCst) != token {
                trace!("fade superseded, exiting");
                return Ok(());
            }

            let elapsed = started_at.elapsed();
            let progress = (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0);
            let value = (start + (target - start) * progress).clamp(0.0, 1.0);
            backend.set_volume(value).await?;

            if progress >= 1.0 {
                return Ok(());
            }
        }
    }
}
