//! # Aura Playback Engine (aura-engine)
//!
//! Core playback engine for the Aura mood-music player.
//!
//! **Purpose:** Own the authoritative playback state, mediate between
//! the two audio backends (native direct-stream player and embedded
//! third-party widget), run volume fades around every transition, and
//! expose a single consistent state machine to the shell.
//!
//! **Architecture:** A [`PlaybackEngine`] orchestrates a
//! [`FadeController`] and two [`backend::Backend`] adapters selected by
//! the active source's kind. State is a single immutable record
//! published through a watch channel; discrete notifications go out on
//! a broadcast channel. All public operations resolve normally and
//! report failure through the published state, never through errors.

pub mod backend;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod fade;
pub mod provider;
pub mod state;

pub use catalog::CatalogProvider;
pub use config::EngineConfig;
pub use engine::PlaybackEngine;
pub use fade::FadeController;
pub use provider::SourceProvider;
pub use state::{PlaybackState, PlaybackStatus, SharedState};
