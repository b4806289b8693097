// ============================================================
// Layer 3 — Playlist Domain Type
// ============================================================
// One playlist as it appears in the arena JSON files
// (train.json, val.json, sample_val.json).
//
// Only `id` is mandatory. Question files carry partial
// playlists, so songs and tags may be empty, and the
// metadata fields are absent from answer files.

use serde::{Deserialize, Serialize};

/// A raw playlist record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    /// Stable playlist identifier — used only to label answers
    pub id: u64,

    /// Original song identifiers, in playlist order
    #[serde(default)]
    pub songs: Vec<u64>,

    /// Free-form tag strings
    #[serde(default)]
    pub tags: Vec<String>,

    /// Number of likes the playlist received
    #[serde(default)]
    pub like_cnt: u64,

    #[serde(default)]
    pub plylst_title: String,

    #[serde(default)]
    pub updt_date: String,
}

impl Playlist {
    pub fn new(id: u64, songs: Vec<u64>, tags: Vec<&str>) -> Self {
        Self {
            id,
            songs,
            tags: tags.into_iter().map(String::from).collect(),
            ..Self::default()
        }
    }
}
