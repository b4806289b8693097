// ============================================================
// Layer 3 — Vocabulary Descriptors
// ============================================================
// Plain descriptions of the id spaces a run trains over.
// The id maps themselves live in infra::vocab_store.

use serde::{Deserialize, Serialize};

/// Widths of the two id spaces. A membership vector is
/// `songs` wide, or `songs + tags` wide with songs first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabSizes {
    pub songs: usize,
    pub tags:  usize,
}

impl VocabSizes {
    pub fn new(songs: usize, tags: usize) -> Self {
        Self { songs, tags }
    }

    pub fn joint(&self) -> usize {
        self.songs + self.tags
    }
}

/// How the song vocabulary is pruned from the training playlists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VocabMethod {
    /// Keep songs that appear in at least `min_count` playlists
    Frequency { min_count: u32 },
    /// Keep the top `fraction` of songs ranked by summed playlist likes
    LikeCount { fraction: f64 },
}

impl VocabMethod {
    /// Build from the CLI pair (method index, threshold).
    /// The frequency threshold is truncated to an integer.
    pub fn from_parts(method: u8, threshold: f64) -> anyhow::Result<Self> {
        match method {
            0 => {
                anyhow::ensure!(threshold >= 0.0, "frequency threshold must be >= 0, got {threshold}");
                Ok(Self::Frequency { min_count: threshold as u32 })
            }
            1 => {
                anyhow::ensure!(
                    threshold > 0.0 && threshold <= 1.0,
                    "like-count threshold must be in (0, 1], got {threshold}"
                );
                Ok(Self::LikeCount { fraction: threshold })
            }
            other => anyhow::bail!("unknown vocabulary method {other} (expected 0 = frequency, 1 = like_cnt)"),
        }
    }

    pub fn index(&self) -> u8 {
        match self {
            Self::Frequency { .. } => 0,
            Self::LikeCount { .. } => 1,
        }
    }

    /// File-name stem used for the song vocabulary files.
    pub fn stem(&self) -> &'static str {
        match self {
            Self::Frequency { .. } => "freq_song",
            Self::LikeCount { .. } => "liked_song",
        }
    }

    /// Threshold as it appears in file names.
    pub fn threshold_label(&self) -> String {
        match self {
            Self::Frequency { min_count } => min_count.to_string(),
            Self::LikeCount { fraction }  => fraction.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_threshold_truncates() {
        let m = VocabMethod::from_parts(0, 2.7).unwrap();
        assert_eq!(m, VocabMethod::Frequency { min_count: 2 });
        assert_eq!(m.threshold_label(), "2");
        assert_eq!(m.stem(), "freq_song");
    }

    #[test]
    fn test_like_count_range_checked() {
        assert!(VocabMethod::from_parts(1, 0.5).is_ok());
        assert!(VocabMethod::from_parts(1, 1.5).is_err());
        assert!(VocabMethod::from_parts(1, 0.0).is_err());
    }

    #[test]
    fn test_unknown_method_rejected() {
        assert!(VocabMethod::from_parts(2, 1.0).is_err());
    }
}
