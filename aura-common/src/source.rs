//! Audio source types
//!
//! An `AudioSource` is one playable unit within a mood's ordered source
//! list. Sources are immutable once produced by a source provider.

use serde::{Deserialize, Serialize};

/// The playback mechanism a source requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Network audio stream played by the native media element
    Stream,
    /// Local audio file played by the native media element
    Local,
    /// Third-party track played through the embedded widget
    Embed,
}

impl SourceKind {
    /// Queue navigation only applies to embed-backed sources.
    pub fn is_embed(self) -> bool {
        matches!(self, SourceKind::Embed)
    }
}

/// One playable unit (stream URL, local file, or embedded track)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioSource {
    /// Unique within its mood's source list
    pub id: String,
    /// Human-readable name shown by the shell
    pub label: String,
    pub kind: SourceKind,
    pub uri: String,
}
