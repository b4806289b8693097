// ============================================================
// Layer 5 — Reconstruction Models
// ============================================================
// One feed-forward autoencoder family covering all four regimes:
//
//   x ──encoder──▶ sigmoid ──dropout──▶ h
//   h ──head──────▶ sigmoid ──▶ reconstruction            (1 head)
//   h ──song_head─▶ sigmoid ──▶ songs                     (2 heads)
//   h ──tag_head──▶ sigmoid ──▶ tags
//
// Every output passes through a sigmoid, so predictions lie
// in (0, 1) and are valid arguments for binary cross-entropy.
//
// Reference: Burn Book §3 (Building Blocks)

use burn::{
    nn::{Dropout, DropoutConfig, Linear, LinearConfig},
    prelude::*,
    tensor::activation::sigmoid,
};

use crate::domain::regime::{HeadLayout, Regime};
use crate::domain::vocab::VocabSizes;

#[derive(Config, Debug)]
pub struct AutoEncoderConfig {
    pub d_in:   usize,
    pub hidden: usize,
    pub layout: HeadLayout,
    #[config(default = 0.0)]
    pub dropout: f64,
}

impl AutoEncoderConfig {
    /// Shapes for a regime over the given vocabularies.
    pub fn for_regime(regime: Regime, sizes: VocabSizes, hidden: usize, dropout: f64) -> Self {
        Self::new(regime.input_width(sizes), hidden, regime.head_layout(sizes))
            .with_dropout(dropout)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> AutoEncoder<B> {
        let encoder = LinearConfig::new(self.d_in, self.hidden).init(device);
        let (head, tag_head) = match self.layout {
            HeadLayout::Single { width } => (LinearConfig::new(self.hidden, width).init(device), None),
            HeadLayout::Dual { songs, tags } => (
                LinearConfig::new(self.hidden, songs).init(device),
                Some(LinearConfig::new(self.hidden, tags).init(device)),
            ),
        };
        let dropout = DropoutConfig::new(self.dropout).init();
        AutoEncoder { encoder, head, tag_head, dropout }
    }
}

#[derive(Module, Debug)]
pub struct AutoEncoder<B: Backend> {
    pub encoder:  Linear<B>,
    /// Joint / song head
    pub head:     Linear<B>,
    /// Present only for the dual-head layout
    pub tag_head: Option<Linear<B>>,
    pub dropout:  Dropout,
}

/// Model output: one reconstruction, or a song/tag pair.
#[derive(Debug, Clone)]
pub enum Reconstruction<B: Backend> {
    Single(Tensor<B, 2>),
    Dual { songs: Tensor<B, 2>, tags: Tensor<B, 2> },
}

impl<B: Backend> AutoEncoder<B> {
    /// inputs: [batch, d_in] → reconstruction(s): [batch, width]
    pub fn forward(&self, inputs: Tensor<B, 2>) -> Reconstruction<B> {
        let hidden = self.dropout.forward(sigmoid(self.encoder.forward(inputs)));

        match &self.tag_head {
            None => Reconstruction::Single(sigmoid(self.head.forward(hidden))),
            Some(tag_head) => Reconstruction::Dual {
                songs: sigmoid(self.head.forward(hidden.clone())),
                tags:  sigmoid(tag_head.forward(hidden)),
            },
        }
    }

    /// Weight shapes of every layer, encoder first.
    /// Used to reject checkpoints built for other vocabularies.
    pub fn shape_signature(&self) -> Vec<[usize; 2]> {
        let mut dims = vec![self.encoder.weight.val().dims(), self.head.weight.val().dims()];
        if let Some(tag_head) = &self.tag_head {
            dims.push(tag_head.weight.val().dims());
        }
        dims
    }
}

impl<B: Backend> Reconstruction<B> {
    /// Output widths, song head first.
    pub fn widths(&self) -> Vec<usize> {
        match self {
            Self::Single(out)          => vec![out.dims()[1]],
            Self::Dual { songs, tags } => vec![songs.dims()[1], tags.dims()[1]],
        }
    }
}
