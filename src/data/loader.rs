// ============================================================
// Layer 4 — Playlist Loader
// ============================================================
// Reads an arena JSON file (an array of playlist objects)
// into domain Playlists.
//
//   [
//     { "id": 61281, "songs": [525514, 129701], "tags": ["락"],
//       "like_cnt": 71, "plylst_title": "...", "updt_date": "..." },
//     ...
//   ]
//
// A missing or malformed file is fatal.

use anyhow::{Context, Result};
use std::{fs::File, io::BufReader, path::PathBuf};

use crate::domain::playlist::Playlist;
use crate::domain::traits::PlaylistSource;

/// Loads playlists from one JSON file.
pub struct PlaylistLoader {
    path: PathBuf,
}

impl PlaylistLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PlaylistSource for PlaylistLoader {
    fn load_all(&self) -> Result<Vec<Playlist>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Cannot open playlist file '{}'", self.path.display()))?;

        let playlists: Vec<Playlist> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Malformed playlist JSON in '{}'", self.path.display()))?;

        tracing::info!("Loaded {} playlists from '{}'", playlists.len(), self.path.display());
        Ok(playlists)
    }
}
