// ============================================================
// Layer 6 — Vocabulary Store
// ============================================================
// Owns the id spaces of a run and their files under the data
// root. Each vocabulary is a pair of companion JSON files:
//
//   tag2id.json                       {"락": 0, "잔잔한": 1, ...}
//   id2tag.json                       {"0": "락", "1": "잔잔한", ...}
//   freq_song2id_thr2.json            {"525514": 0, ...}
//   id2freq_song_thr2.json            {"0": 525514, ...}
//
// A vocabulary is loaded only when BOTH files exist. If either
// is missing the pair is rebuilt from the training playlists
// and both files are rewritten, so a half-written pair from a
// crashed run never survives.
//
// Ids are assigned by descending score with deterministic
// tie-breaks, so rebuilding from the same file reproduces the
// same ids.

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fs,
    hash::Hash,
    path::{Path, PathBuf},
};

use crate::domain::playlist::Playlist;
use crate::domain::vocab::VocabMethod;

// ─── Id maps ──────────────────────────────────────────────────────────────────
/// Dense id ↔ original song id.
#[derive(Debug, Clone, PartialEq)]
pub struct SongVocab {
    song2id: HashMap<u64, usize>,
    id2song: Vec<u64>,
}

impl SongVocab {
    /// Dense ids follow the order of `id2song`
    pub fn from_ids(id2song: Vec<u64>) -> Self {
        let song2id = id2song.iter().enumerate().map(|(i, s)| (*s, i)).collect();
        Self { song2id, id2song }
    }

    pub fn id_of(&self, song: u64) -> Option<usize> {
        self.song2id.get(&song).copied()
    }

    /// Dense id → original song id
    pub fn lookup(&self) -> &[u64] {
        &self.id2song
    }

    pub fn len(&self) -> usize {
        self.id2song.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id2song.is_empty()
    }
}

/// Dense id ↔ tag string.
#[derive(Debug, Clone, PartialEq)]
pub struct TagVocab {
    tag2id: HashMap<String, usize>,
    id2tag: Vec<String>,
}

impl TagVocab {
    pub fn from_tags(id2tag: Vec<String>) -> Self {
        let tag2id = id2tag.iter().enumerate().map(|(i, t)| (t.clone(), i)).collect();
        Self { tag2id, id2tag }
    }

    pub fn id_of(&self, tag: &str) -> Option<usize> {
        self.tag2id.get(tag).copied()
    }

    pub fn lookup(&self) -> &[String] {
        &self.id2tag
    }

    pub fn len(&self) -> usize {
        self.id2tag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id2tag.is_empty()
    }
}

// ─── VocabStore ───────────────────────────────────────────────────────────────
pub struct VocabStore {
    dir: PathBuf,
}

impl VocabStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// (tag→id, id→tag) file paths
    pub fn tag_paths(&self) -> (PathBuf, PathBuf) {
        (self.dir.join("tag2id.json"), self.dir.join("id2tag.json"))
    }

    /// (song→id, id→song) file paths for a pruning method
    pub fn song_paths(&self, method: VocabMethod) -> (PathBuf, PathBuf) {
        let stem = method.stem();
        let thr  = method.threshold_label();
        (
            self.dir.join(format!("{stem}2id_thr{thr}.json")),
            self.dir.join(format!("id2{stem}_thr{thr}.json")),
        )
    }

    /// Load the tag vocabulary, rebuilding both files if either is missing.
    pub fn load_or_build_tags(&self, train: &[Playlist]) -> Result<TagVocab> {
        let (fwd, rev) = self.tag_paths();
        if fwd.exists() && rev.exists() {
            tracing::info!("Loading tag vocabulary from '{}'", self.dir.display());
            let id2tag = load_pair::<String>(&fwd, &rev)?;
            return Ok(TagVocab::from_tags(id2tag));
        }

        tracing::info!("Building tag vocabulary from {} playlists", train.len());
        let vocab = TagVocab::from_tags(build_tag_ids(train));
        save_pair(&fwd, &rev, vocab.lookup())?;
        tracing::info!("Tag vocabulary: {} tags", vocab.len());
        Ok(vocab)
    }

    /// Load the song vocabulary for `method`, rebuilding both files if either is missing.
    pub fn load_or_build_songs(&self, train: &[Playlist], method: VocabMethod) -> Result<SongVocab> {
        let (fwd, rev) = self.song_paths(method);
        if fwd.exists() && rev.exists() {
            tracing::info!("Loading song vocabulary '{}'", fwd.display());
            let id2song = load_pair::<u64>(&fwd, &rev)?;
            return Ok(SongVocab::from_ids(id2song));
        }

        tracing::info!("Building song vocabulary ({:?}) from {} playlists", method, train.len());
        let vocab = SongVocab::from_ids(build_song_ids(train, method));
        save_pair(&fwd, &rev, vocab.lookup())?;
        tracing::info!("Song vocabulary: {} songs", vocab.len());
        Ok(vocab)
    }
}

// ─── Construction ─────────────────────────────────────────────────────────────
/// Tags ordered by playlist count, then lexicographically.
pub fn build_tag_ids(train: &[Playlist]) -> Vec<String> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for p in train {
        let unique: HashSet<&str> = p.tags.iter().map(String::as_str).collect();
        for t in unique {
            *counts.entry(t).or_insert(0) += 1;
        }
    }
    rank_desc(counts).into_iter().map(String::from).collect()
}

/// Songs kept by `method`, best first.
pub fn build_song_ids(train: &[Playlist], method: VocabMethod) -> Vec<u64> {
    let mut scores: HashMap<u64, u64> = HashMap::new();
    for p in train {
        let unique: HashSet<u64> = p.songs.iter().copied().collect();
        let weight = match method {
            VocabMethod::Frequency { .. } => 1,
            VocabMethod::LikeCount { .. } => p.like_cnt,
        };
        for s in unique {
            *scores.entry(s).or_insert(0) += weight;
        }
    }

    match method {
        VocabMethod::Frequency { min_count } => {
            scores.retain(|_, c| *c >= u64::from(min_count));
            rank_desc(scores)
        }
        VocabMethod::LikeCount { fraction } => {
            let ranked = rank_desc(scores);
            let keep   = ((ranked.len() as f64) * fraction).ceil() as usize;
            ranked.into_iter().take(keep).collect()
        }
    }
}

/// Keys by descending score, ascending key on ties.
fn rank_desc<K: Ord + Copy + Hash>(scores: HashMap<K, u64>) -> Vec<K> {
    let mut ranked: Vec<(K, u64)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.into_iter().map(|(k, _)| k).collect()
}

// ─── File I/O ─────────────────────────────────────────────────────────────────
fn save_pair<T>(fwd: &Path, rev: &Path, id2x: &[T]) -> Result<()>
where
    T: Serialize + Eq + Hash,
{
    if let Some(parent) = fwd.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create vocabulary directory '{}'", parent.display()))?;
    }

    let x2id: HashMap<&T, usize> = id2x.iter().enumerate().map(|(i, x)| (x, i)).collect();
    let id2x_map: BTreeMap<usize, &T> = id2x.iter().enumerate().collect();

    fs::write(fwd, serde_json::to_string(&x2id)?)
        .with_context(|| format!("Cannot write vocabulary '{}'", fwd.display()))?;
    fs::write(rev, serde_json::to_string(&id2x_map)?)
        .with_context(|| format!("Cannot write vocabulary '{}'", rev.display()))?;
    Ok(())
}

/// Read both files and return the id→value table.
/// The two files must describe the same dense id range.
fn load_pair<T>(fwd: &Path, rev: &Path) -> Result<Vec<T>>
where
    T: DeserializeOwned + Eq + Hash,
{
    let x2id: HashMap<T, usize> = read_json(fwd)?;
    let id2x: BTreeMap<usize, T> = read_json(rev)?;

    anyhow::ensure!(
        x2id.len() == id2x.len(),
        "Vocabulary files '{}' and '{}' disagree ({} vs {} entries)",
        fwd.display(), rev.display(), x2id.len(), id2x.len()
    );

    let mut table = Vec::with_capacity(id2x.len());
    for (expected, (id, value)) in id2x.into_iter().enumerate() {
        anyhow::ensure!(id == expected, "Vocabulary '{}' has a gap at id {}", rev.display(), expected);
        anyhow::ensure!(
            x2id.get(&value) == Some(&id),
            "Vocabulary '{}' does not invert '{}' at id {}",
            fwd.display(), rev.display(), id
        );
        table.push(value);
    }
    Ok(table)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let s = fs::read_to_string(path)
        .with_context(|| format!("Cannot read vocabulary '{}'", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("Malformed vocabulary '{}'", path.display()))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn train() -> Vec<Playlist> {
        let mut a = Playlist::new(1, vec![10, 20, 30], vec!["rock", "pop"]);
        a.like_cnt = 1;
        let mut b = Playlist::new(2, vec![20, 30], vec!["rock"]);
        b.like_cnt = 10;
        let mut c = Playlist::new(3, vec![30, 40], vec!["jazz", "rock"]);
        c.like_cnt = 100;
        vec![a, b, c]
    }

    #[test]
    fn test_tag_ids_by_frequency_then_name() {
        assert_eq!(build_tag_ids(&train()), vec!["rock", "jazz", "pop"]);
    }

    #[test]
    fn test_frequency_threshold() {
        let ids = build_song_ids(&train(), VocabMethod::Frequency { min_count: 2 });
        assert_eq!(ids, vec![30, 20]);
    }

    #[test]
    fn test_like_count_fraction() {
        // scores: 30 → 111, 40 → 100, 20 → 11, 10 → 1
        let ids = build_song_ids(&train(), VocabMethod::LikeCount { fraction: 0.5 });
        assert_eq!(ids, vec![30, 40]);
    }

    #[test]
    fn test_build_then_load_round_trip() {
        let dir   = tempfile::tempdir().unwrap();
        let store = VocabStore::new(dir.path());

        let built = store.load_or_build_tags(&train()).unwrap();
        let (fwd, rev) = store.tag_paths();
        assert!(fwd.exists() && rev.exists());

        // Loading must not need the playlists any more
        let loaded = store.load_or_build_tags(&[]).unwrap();
        assert_eq!(built, loaded);
        assert_eq!(loaded.id_of("rock"), Some(0));
    }

    #[test]
    fn test_half_missing_pair_is_rebuilt() {
        let dir   = tempfile::tempdir().unwrap();
        let store = VocabStore::new(dir.path());
        let (fwd, rev) = store.tag_paths();

        // Only one of the two companion files present
        fs::write(&fwd, r#"{"stale": 0}"#).unwrap();
        assert!(!rev.exists());

        let vocab = store.load_or_build_tags(&train()).unwrap();
        assert_eq!(vocab.len(), 3);
        assert!(rev.exists());
        assert_eq!(vocab.id_of("stale"), None);
    }

    #[test]
    fn test_song_vocab_files_named_by_method() {
        let dir   = tempfile::tempdir().unwrap();
        let store = VocabStore::new(dir.path());
        let method = VocabMethod::Frequency { min_count: 2 };

        let vocab = store.load_or_build_songs(&train(), method).unwrap();
        assert_eq!(vocab.lookup(), &[30, 20]);
        assert!(dir.path().join("freq_song2id_thr2.json").exists());
        assert!(dir.path().join("id2freq_song_thr2.json").exists());
    }

    #[test]
    fn test_inconsistent_pair_is_an_error() {
        let dir   = tempfile::tempdir().unwrap();
        let store = VocabStore::new(dir.path());
        let (fwd, rev) = store.tag_paths();
        fs::write(&fwd, r#"{"a": 0, "b": 1}"#).unwrap();
        fs::write(&rev, r#"{"0": "a"}"#).unwrap();
        assert!(store.load_or_build_tags(&train()).is_err());
    }
}
