// ============================================================
// Layer 5 — Per-Regime Loss and Decode Paths
// ============================================================
// The training loop is one skeleton; the regime plugs in:
//
//   regime_loss   — which target each head is compared with
//   decode_heads  — which input/output columns feed the
//                   recommendation extractor
//
//   regime | loss target(s)                    | tag decode
//   -------+-----------------------------------+--------------
//   0      | whole input (songs)               | placeholder
//   1      | whole input, or song slice        | joint output
//          |   when song-only                  |  / placeholder
//   2      | song slice                        | placeholder
//   3      | song slice ↔ song head            | tag head
//          | tag slice  ↔ tag head             |
//
// Reconstruction loss is binary cross-entropy, averaged over
// every element of the batch. Predictions are clamped away
// from 0 and 1 before the log: a saturated sigmoid rounds to
// exactly 1.0 in f32, and log(1 - 1.0) would turn the loss and
// its gradient into inf/NaN. Targets stay float tensors, the
// same multi-hot rows the model reads as input.

use anyhow::Result;
use burn::prelude::*;
use std::ops::Range;

use crate::domain::regime::Regime;
use crate::domain::vocab::VocabSizes;
use crate::ml::model::Reconstruction;

/// Predictions are clamped to [EPS, 1 - EPS] before the log.
pub const BCE_EPS: f64 = 1e-7;

/// Mean binary cross-entropy between predictions in (0, 1)
/// and {0, 1} targets. Non-negative for such inputs.
pub fn binary_cross_entropy<B: Backend>(pred: Tensor<B, 2>, target: Tensor<B, 2>) -> Tensor<B, 1> {
    let pred = pred.clamp(BCE_EPS, 1.0 - BCE_EPS);
    // -( t·log(p) + (1 - t)·log(1 - p) )
    let hit  = target.clone() * pred.clone().log();
    let miss = target.neg().add_scalar(1.0) * pred.neg().add_scalar(1.0).log();
    (hit + miss).mean().neg()
}

/// Loss of one batch. `tags` is set only for the dual-head regime,
/// where the two heads are scored against separate targets.
#[derive(Debug, Clone)]
pub struct RegimeLoss<B: Backend> {
    pub primary: Tensor<B, 1>,
    pub tags:    Option<Tensor<B, 1>>,
}

impl<B: Backend> RegimeLoss<B> {
    /// Sum of the head losses. Its gradient is the sum of the
    /// per-head gradients, so one backward over the total and
    /// a single optimizer step accumulates both heads.
    pub fn total(self) -> Tensor<B, 1> {
        match self.tags {
            Some(tags) => self.primary + tags,
            None       => self.primary,
        }
    }

    /// Scalar value for the running-loss log.
    pub fn value(&self) -> f64 {
        let primary = self.primary.clone().into_scalar().elem::<f64>();
        let tags = self
            .tags
            .as_ref()
            .map_or(0.0, |t| t.clone().into_scalar().elem::<f64>());
        primary + tags
    }
}

/// Columns `range` of a [batch, width] tensor.
pub fn columns<B: Backend>(t: Tensor<B, 2>, range: Range<usize>) -> Tensor<B, 2> {
    let [rows, _] = t.dims();
    t.slice([0..rows, range])
}

pub fn regime_loss<B: Backend>(
    regime: Regime,
    sizes:  VocabSizes,
    inputs: Tensor<B, 2>,
    output: Reconstruction<B>,
) -> Result<RegimeLoss<B>> {
    let loss = match (regime, output) {
        (Regime::SongAutoEncoder | Regime::Joint { song_only: false }, Reconstruction::Single(out)) => {
            RegimeLoss { primary: binary_cross_entropy(out, inputs), tags: None }
        }
        (Regime::Joint { song_only: true } | Regime::JointToSongs, Reconstruction::Single(out)) => {
            let songs = columns(inputs, 0..sizes.songs);
            RegimeLoss { primary: binary_cross_entropy(out, songs), tags: None }
        }
        (Regime::DualHead, Reconstruction::Dual { songs, tags }) => {
            let song_target = columns(inputs.clone(), 0..sizes.songs);
            let tag_target  = columns(inputs, sizes.songs..sizes.joint());
            RegimeLoss {
                primary: binary_cross_entropy(songs, song_target),
                tags:    Some(binary_cross_entropy(tags, tag_target)),
            }
        }
        (regime, output) => anyhow::bail!(
            "regime {:?} cannot score a model output with widths {:?}",
            regime, output.widths()
        ),
    };
    Ok(loss)
}

/// (input columns, score columns) handed to the extractor.
#[derive(Debug, Clone)]
pub struct DecodePair<B: Backend> {
    pub input:  Tensor<B, 2>,
    pub scores: Tensor<B, 2>,
}

/// What a regime recommends from: always songs, tags when decoded.
#[derive(Debug, Clone)]
pub struct DecodePlan<B: Backend> {
    pub songs: DecodePair<B>,
    pub tags:  Option<DecodePair<B>>,
}

pub fn decode_heads<B: Backend>(
    regime: Regime,
    sizes:  VocabSizes,
    inputs: Tensor<B, 2>,
    output: Reconstruction<B>,
) -> Result<DecodePlan<B>> {
    let plan = match (regime, output) {
        (Regime::SongAutoEncoder, Reconstruction::Single(out)) => DecodePlan {
            songs: DecodePair { input: inputs, scores: out },
            tags:  None,
        },
        (Regime::Joint { song_only: false }, Reconstruction::Single(out)) => DecodePlan {
            songs: DecodePair {
                input:  columns(inputs.clone(), 0..sizes.songs),
                scores: columns(out.clone(), 0..sizes.songs),
            },
            tags: Some(DecodePair {
                input:  columns(inputs, sizes.songs..sizes.joint()),
                scores: columns(out, sizes.songs..sizes.joint()),
            }),
        },
        (Regime::Joint { song_only: true } | Regime::JointToSongs, Reconstruction::Single(out)) => DecodePlan {
            songs: DecodePair { input: columns(inputs, 0..sizes.songs), scores: out },
            tags:  None,
        },
        (Regime::DualHead, Reconstruction::Dual { songs, tags }) => DecodePlan {
            songs: DecodePair { input: columns(inputs.clone(), 0..sizes.songs), scores: songs },
            tags:  Some(DecodePair { input: columns(inputs, sizes.songs..sizes.joint()), scores: tags }),
        },
        (regime, output) => anyhow::bail!(
            "regime {:?} cannot decode a model output with widths {:?}",
            regime, output.widths()
        ),
    };
    Ok(plan)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::AutoEncoderConfig;
    use burn::backend::NdArray;
    use burn::tensor::TensorData;

    type TestBackend = NdArray<f32>;

    const SIZES: VocabSizes = VocabSizes { songs: 3, tags: 2 };

    fn tensor(rows: usize, cols: usize, values: Vec<f32>) -> Tensor<TestBackend, 2> {
        Tensor::from_data(TensorData::new(values, [rows, cols]), &Default::default())
    }

    fn joint_inputs() -> Tensor<TestBackend, 2> {
        tensor(2, 5, vec![
            1.0, 0.0, 1.0, 0.0, 1.0,
            0.0, 0.0, 0.0, 0.0, 0.0,
        ])
    }

    #[test]
    fn test_bce_perfect_prediction_is_near_zero() {
        let t = tensor(1, 3, vec![1.0, 0.0, 1.0]);
        let loss = binary_cross_entropy(t.clone(), t).into_scalar();
        assert!(loss >= 0.0 && loss < 1e-5, "loss = {loss}");
    }

    #[test]
    fn test_bce_of_half_is_ln2() {
        let p = tensor(1, 2, vec![0.5, 0.5]);
        let t = tensor(1, 2, vec![1.0, 0.0]);
        let loss = binary_cross_entropy(p, t).into_scalar();
        assert!((loss - std::f32::consts::LN_2).abs() < 1e-5);
    }

    #[test]
    fn test_every_regime_loss_is_non_negative() {
        let device = Default::default();
        for regime in [
            Regime::SongAutoEncoder,
            Regime::Joint { song_only: false },
            Regime::Joint { song_only: true },
            Regime::JointToSongs,
            Regime::DualHead,
        ] {
            let model = AutoEncoderConfig::for_regime(regime, SIZES, 4, 0.0).init::<TestBackend>(&device);
            let inputs = if regime.uses_tags() {
                joint_inputs()
            } else {
                tensor(2, 3, vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0])
            };
            let output = model.forward(inputs.clone());
            let loss   = regime_loss(regime, SIZES, inputs, output).unwrap();
            assert!(loss.value() >= 0.0, "{regime:?} produced a negative loss");
        }
    }

    #[test]
    fn test_dual_head_losses_are_independent() {
        // Fixed predictions for both heads
        let songs_pred = tensor(2, 3, vec![0.9, 0.2, 0.7, 0.1, 0.3, 0.5]);
        let tags_pred  = tensor(2, 2, vec![0.4, 0.6, 0.8, 0.2]);
        let output = || Reconstruction::Dual { songs: songs_pred.clone(), tags: tags_pred.clone() };

        let base = regime_loss(Regime::DualHead, SIZES, joint_inputs(), output()).unwrap();

        // Flip one song target only; the tag block is untouched
        let mutated_inputs = tensor(2, 5, vec![
            0.0, 1.0, 1.0, 0.0, 1.0,
            0.0, 0.0, 0.0, 0.0, 0.0,
        ]);
        let mutated = regime_loss(Regime::DualHead, SIZES, mutated_inputs, output()).unwrap();

        let song_before = base.primary.into_scalar();
        let song_after  = mutated.primary.into_scalar();
        let tag_before  = base.tags.unwrap().into_scalar();
        let tag_after   = mutated.tags.unwrap().into_scalar();

        assert_ne!(song_before, song_after);
        assert_eq!(tag_before.to_bits(), tag_after.to_bits());
    }

    #[test]
    fn test_mismatched_output_is_rejected() {
        let out = Reconstruction::Single(tensor(2, 3, vec![0.5; 6]));
        assert!(regime_loss(Regime::DualHead, SIZES, joint_inputs(), out).is_err());
    }

    #[test]
    fn test_joint_decode_splits_song_and_tag_columns() {
        let out  = tensor(2, 5, vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0]);
        let plan = decode_heads(Regime::Joint { song_only: false }, SIZES, joint_inputs(), Reconstruction::Single(out)).unwrap();

        assert_eq!(plan.songs.scores.dims(), [2, 3]);
        let tags = plan.tags.expect("joint regime decodes tags");
        assert_eq!(tags.input.dims(), [2, 2]);
        assert_eq!(tags.scores.into_data().to_vec::<f32>().unwrap(), vec![0.4, 0.5, 0.9, 1.0]);
    }

    #[test]
    fn test_song_only_regimes_skip_tag_decode() {
        for regime in [Regime::Joint { song_only: true }, Regime::JointToSongs] {
            let out  = tensor(2, 3, vec![0.5; 6]);
            let plan = decode_heads(regime, SIZES, joint_inputs(), Reconstruction::Single(out)).unwrap();
            assert!(plan.tags.is_none());
            assert_eq!(plan.songs.input.dims(), [2, 3]);
        }
    }
}
