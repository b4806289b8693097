// ============================================================
// Layer 3 — Training Regimes
// ============================================================
// The four (input, output, loss) configurations a run can use.
//
//   selector | input       | output              | heads
//   ---------+-------------+---------------------+------
//   0        | songs       | songs               | 1
//   1        | songs+tags  | songs+tags (or songs| 1
//            |             | with --song-only)   |
//   2        | songs+tags  | songs               | 1
//   3        | songs+tags  | songs, tags         | 2
//
// The regime is the only thing the training loop branches on.
// Loss composition and decoding live in ml::objective; this
// module only answers shape questions.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::vocab::VocabSizes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    /// 0 — song vector in, song vector out
    SongAutoEncoder,
    /// 1 — joint vector in, joint vector out (songs only if `song_only`)
    Joint { song_only: bool },
    /// 2 — joint vector in, song vector out
    JointToSongs,
    /// 3 — joint vector in, separate song and tag heads
    DualHead,
}

/// Output heads of a reconstruction model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeadLayout {
    Single { width: usize },
    Dual { songs: usize, tags: usize },
}

impl Regime {
    /// Map the numeric model selector onto a regime.
    /// `song_only` only affects selector 1.
    pub fn from_selector(selector: u8, song_only: bool) -> Result<Self> {
        match selector {
            0 => Ok(Self::SongAutoEncoder),
            1 => Ok(Self::Joint { song_only }),
            2 => Ok(Self::JointToSongs),
            3 => Ok(Self::DualHead),
            other => anyhow::bail!("unknown model type {other}: expected 0, 1, 2 or 3"),
        }
    }

    /// Whether the input vector carries the tag block.
    pub fn uses_tags(&self) -> bool {
        !matches!(self, Self::SongAutoEncoder)
    }

    pub fn input_width(&self, sizes: VocabSizes) -> usize {
        if self.uses_tags() { sizes.joint() } else { sizes.songs }
    }

    pub fn head_layout(&self, sizes: VocabSizes) -> HeadLayout {
        match self {
            Self::SongAutoEncoder
            | Self::JointToSongs
            | Self::Joint { song_only: true } => HeadLayout::Single { width: sizes.songs },
            Self::Joint { song_only: false } => HeadLayout::Single { width: sizes.joint() },
            Self::DualHead => HeadLayout::Dual { songs: sizes.songs, tags: sizes.tags },
        }
    }

    /// Checkpoint file-name prefix; one lineage per regime.
    pub fn checkpoint_prefix(&self) -> &'static str {
        match self {
            Self::SongAutoEncoder              => "autoencoder0",
            Self::Joint { song_only: false }   => "autoencoder",
            Self::Joint { song_only: true }    => "autoencoder_song_out",
            Self::JointToSongs                 => "autoencoder_var_song_only",
            Self::DualHead                     => "autoencoder_var",
        }
    }
}
