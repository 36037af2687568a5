//! Mood types and seed data
//!
//! A mood is a named category mapping to an ordered list of audio
//! sources. Mood CRUD lives in the shell's storage layer; the engine
//! only ever sees mood identifiers.

use serde::{Deserialize, Serialize};

/// Accent color used by the shell when rendering a mood card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorAccent {
    Blue,
    Amber,
    Teal,
    Rose,
    Violet,
}

/// A named category mapping to an ordered source list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mood {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    /// Relative intensity in [0, 1], used for sorting/display only
    pub energy_level: f32,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_accent: Option<ColorAccent>,
    /// Position in the user's mood list
    pub order: u32,
}

/// Seed moods installed on first run, in canonical order.
pub fn default_moods() -> Vec<Mood> {
    let seeds = [
        (
            "jazz",
            "Jazz",
            "Light and calm",
            0.35,
            &["jazz", "smooth", "chill"][..],
            "\u{1F319}",
            ColorAccent::Blue,
        ),
        (
            "energy",
            "Energy",
            "High tempo boost",
            0.9,
            &["energy", "upbeat", "boost"][..],
            "\u{26A1}",
            ColorAccent::Amber,
        ),
        (
            "paradise",
            "Paradise",
            "No distraction",
            0.75,
            &["paradise", "deep", "ambient"][..],
            "\u{1F9E0}",
            ColorAccent::Teal,
        ),
        (
            "focus",
            "Deep Focus",
            "Deep concentration",
            0.65,
            &["focus", "flow", "work"][..],
            "\u{1F319}",
            ColorAccent::Teal,
        ),
    ];

    seeds
        .iter()
        .enumerate()
        .map(|(index, (id, title, subtitle, energy, tags, icon, accent))| Mood {
            id: (*id).to_string(),
            title: (*title).to_string(),
            subtitle: (*subtitle).to_string(),
            energy_level: *energy,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            icon: Some((*icon).to_string()),
            color_accent: Some(*accent),
            order: index as u32,
        })
        .collect()
}
