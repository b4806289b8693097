// ============================================================
// Layer 4 — Membership Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<PlaylistSample>
// (sparse id lists) into one dense multi-hot tensor.
//
// How batching works here:
//   Input:  N samples, each a list of song ids and tag ids
//   Output: MembershipBatch with inputs of shape [N, W]
//           where W = songs, or songs + tags
//
//   All rows are written into one flat zeroed Vec<f32>,
//   then handed to Burn as TensorData with shape [N, W].
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};

use crate::data::dataset::PlaylistSample;

// ─── MembershipBatch ──────────────────────────────────────────────────────────
/// A batch of playlists ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct MembershipBatch<B: Backend> {
    /// Playlist ids, row-aligned with `inputs`
    pub ids: Vec<u64>,

    /// Multi-hot membership vectors — shape: [batch_size, input_width]
    pub inputs: Tensor<B, 2>,
}

// ─── MembershipBatcher ────────────────────────────────────────────────────────
/// Holds the target device and the vector layout.
#[derive(Clone, Debug)]
pub struct MembershipBatcher<B: Backend> {
    pub device:      B::Device,
    /// Width of the song block
    pub songs_width: usize,
    /// Full row width (songs, or songs + tags)
    pub input_width: usize,
}

impl<B: Backend> MembershipBatcher<B> {
    pub fn new(device: B::Device, songs_width: usize, input_width: usize) -> Self {
        Self { device, songs_width, input_width }
    }
}

impl<B: Backend> Batcher<PlaylistSample, MembershipBatch<B>> for MembershipBatcher<B> {
    fn batch(&self, items: Vec<PlaylistSample>) -> MembershipBatch<B> {
        let batch_size = items.len();
        let width      = self.input_width;

        let mut flat = vec![0.0f32; batch_size * width];
        for (row, sample) in flat.chunks_mut(width.max(1)).zip(items.iter()) {
            sample.fill_row(row, self.songs_width);
        }

        let ids = items.iter().map(|s| s.id).collect();
        let inputs = Tensor::<B, 2>::from_data(
            TensorData::new(flat, [batch_size, width]),
            &self.device,
        );

        MembershipBatch { ids, inputs }
    }
}
