use burn::data::dataset::Dataset;

use crate::domain::playlist::Playlist;
use crate::domain::vocab::VocabSizes;
use crate::infra::vocab_store::{SongVocab, TagVocab};

/// One playlist reduced to dense vocabulary ids.
/// Stored sparse; the batcher expands it to a multi-hot row.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistSample {
    pub id:    u64,
    pub songs: Vec<usize>,
    pub tags:  Vec<usize>,
}

impl PlaylistSample {
    /// Write this sample's membership vector into `row`.
    /// Song ids occupy `[0, songs_width)`, tag ids follow.
    /// `row` must be zeroed and exactly the input width.
    pub fn fill_row(&self, row: &mut [f32], songs_width: usize) {
        for &s in &self.songs {
            row[s] = 1.0;
        }
        if row.len() > songs_width {
            for &t in &self.tags {
                row[songs_width + t] = 1.0;
            }
        }
    }
}

/// Playlists mapped onto a fixed song (and optionally tag) vocabulary.
///
/// Songs and tags outside the vocabulary are dropped; the
/// playlist itself is kept even if nothing survives, so every
/// question playlist still gets an answer record.
pub struct MembershipDataset {
    samples:   Vec<PlaylistSample>,
    sizes:     VocabSizes,
    with_tags: bool,
}

impl MembershipDataset {
    pub fn build(playlists: &[Playlist], songs: &SongVocab, tags: Option<&TagVocab>) -> Self {
        let samples = playlists
            .iter()
            .map(|p| {
                let mut song_ids: Vec<usize> = p.songs.iter().filter_map(|s| songs.id_of(*s)).collect();
                song_ids.sort_unstable();
                song_ids.dedup();

                let mut tag_ids: Vec<usize> = match tags {
                    Some(v) => p.tags.iter().filter_map(|t| v.id_of(t)).collect(),
                    None    => Vec::new(),
                };
                tag_ids.sort_unstable();
                tag_ids.dedup();

                PlaylistSample { id: p.id, songs: song_ids, tags: tag_ids }
            })
            .collect();

        let sizes = VocabSizes::new(songs.len(), tags.map_or(0, |t| t.len()));
        Self { samples, sizes, with_tags: tags.is_some() }
    }

    pub fn sizes(&self) -> VocabSizes { self.sizes }

    /// Width of one membership vector
    pub fn input_width(&self) -> usize {
        if self.with_tags { self.sizes.joint() } else { self.sizes.songs }
    }

    pub fn sample_count(&self) -> usize { self.samples.len() }

}

impl Dataset<PlaylistSample> for MembershipDataset {
    fn get(&self, index: usize) -> Option<PlaylistSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
