//! Built-in station catalog
//!
//! The fixed catalog shipped with the player: each seed mood maps to an
//! ordered list of stations. Jazz/energy/paradise are single live
//! streams; focus is a queue of embedded tracks. Mood identifiers not
//! in the catalog resolve to the focus list, so a freshly created
//! custom mood still plays something.

use async_trait::async_trait;
use aura_common::{AudioSource, SourceKind};

use crate::provider::SourceProvider;

struct Station {
    label: &'static str,
    uri: &'static str,
}

const JAZZ: &[Station] = &[Station {
    label: "Radio Swiss Jazz",
    uri: "https://stream.srg-ssr.ch/srgssr/rsj/mp3/128",
}];

const ENERGY: &[Station] = &[Station {
    label: "KEXP",
    uri: "https://kexp.streamguys1.com/kexp160.aac",
}];

const PARADISE: &[Station] = &[Station {
    label: "Radio Paradise",
    uri: "http://stream-dc1.radioparadise.com/mp3-192",
}];

const FOCUS: &[Station] = &[
    Station {
        label: "Idea 22",
        uri: "https://soundcloud.com/mythostempest/idea-22-but-it-sounds-like",
    },
    Station {
        label: "Losing (Slowed)",
        uri: "https://soundcloud.com/lon_nex/losing-slowed-down",
    },
    Station {
        label: "Bleak Midwinter (1 Hour)",
        uri: "https://soundcloud.com/youmadethis/in-the-bleak-midwinter-slowed-1-hour",
    },
    Station {
        label: "Where Do We Go (Loop)",
        uri: "https://soundcloud.com/tekkecore/wheredowego-intro-11min-loop",
    },
    Station {
        label: "Everything In Its Right Place",
        uri: "https://soundcloud.com/akame-assassin/radiohead-everything-in-its",
    },
    Station {
        label: "Sage",
        uri: "https://soundcloud.com/user-396074918/sage",
    },
    Station {
        label: "TXMY Ethereal (Slowed)",
        uri: "https://soundcloud.com/mydigjjwzajt/txmy-ethereal-slowed-to",
    },
];

/// Canonical catalog mood order.
pub const MOOD_ORDER: [&str; 4] = ["jazz", "energy", "paradise", "focus"];

fn resolve_mood_key(mood_id: &str) -> &'static str {
    match mood_id.trim().to_lowercase().as_str() {
        "jazz" => "jazz",
        "energy" => "energy",
        "paradise" => "paradise",
        _ => "focus",
    }
}

fn stations_for_key(key: &str) -> (&'static [Station], SourceKind) {
    match key {
        "jazz" => (JAZZ, SourceKind::Stream),
        "energy" => (ENERGY, SourceKind::Stream),
        "paradise" => (PARADISE, SourceKind::Stream),
        _ => (FOCUS, SourceKind::Embed),
    }
}

/// Resolve a mood to its catalog sources, with stable per-mood ids.
pub fn sources_for_mood(mood_id: &str) -> Vec<AudioSource> {
    let key = resolve_mood_key(mood_id);
    let (stations, kind) = stations_for_key(key);

    stations
        .iter()
        .enumerate()
        .map(|(index, station)| AudioSource {
            id: format!("{}-station-{}", key, index + 1),
            label: station.label.to_string(),
            kind,
            uri: station.uri.to_string(),
        })
        .collect()
}

/// [`SourceProvider`] backed by the built-in catalog tables.
pub struct CatalogProvider;

#[async_trait]
impl SourceProvider for CatalogProvider {
    async fn list_sources_for_mood(&self, mood_id: &str) -> Vec<AudioSource> {
        sources_for_mood(mood_id)
    }
}
