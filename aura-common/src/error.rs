//! Common error types for Aura
//!
//! Internal seams (backends, adapters, config loading) return these
//! errors with enough detail for logging. The playback engine catches
//! all of them at its boundary and publishes only the generic
//! user-facing message, so transport-level detail never reaches the UI.

use thiserror::Error;

/// User-facing failure message for every playback-related error.
///
/// End users cannot act on transport detail (DNS failure vs. codec
/// mismatch), so all backend failures normalize to this one string.
pub const SOURCE_UNAVAILABLE: &str = "Source unavailable";

/// Common result type for Aura operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types shared across the Aura crates
#[derive(Error, Debug)]
pub enum Error {
    /// The bound source cannot be played (load/play rejection, empty
    /// catalog, widget-reported failure)
    #[error("source unavailable")]
    SourceUnavailable,

    /// Backend-level failure with underlying detail (kept for logs)
    #[error("backend error: {0}")]
    Backend(String),

    /// Bounded wait on an asynchronous backend signal expired
    #[error("timed out waiting for {0}")]
    Timeout(String),

    /// Configuration loading or validation error
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The message published in `PlaybackState.error`.
    ///
    /// Every variant maps to the same coarse user-facing kind; the
    /// detailed cause is only ever logged.
    pub fn user_message(&self) -> &'static str {
        SOURCE_UNAVAILABLE
    }
}
