//! Source provider contract
//!
//! A source provider resolves a mood identifier to its ordered list of
//! candidate sources. Pure lookup, no state.

use async_trait::async_trait;
use aura_common::AudioSource;

/// Supplies, for a mood identifier, its ordered candidate source list.
///
/// Implementations must not fail for an unknown mood; they return an
/// empty list instead, which the engine maps to its error state.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    async fn list_sources_for_mood(&self, mood_id: &str) -> Vec<AudioSource>;
}
