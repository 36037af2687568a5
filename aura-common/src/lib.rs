//! # Aura Common Library
//!
//! Shared code for the Aura mood-music player:
//! - Error type used across the engine and its collaborators
//! - Event types (PlayerEvent enum)
//! - Audio source and mood data types
//! - Application settings types and normalization

pub mod error;
pub mod events;
pub mod mood;
pub mod settings;
pub mod source;

pub use error::{Error, Result};
pub use settings::clamp01;
pub use source::{AudioSource, SourceKind};
