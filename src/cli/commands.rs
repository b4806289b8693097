// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `evaluate`, and
// all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, enums)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::application::train_use_case::{DeviceKind, TrainConfig};
use crate::domain::{regime::Regime, vocab::VocabMethod};

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a playlist autoencoder, evaluating periodically
    Train(TrainArgs),

    /// Score an answer file against a ground-truth file
    Evaluate(EvaluateArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceArg {
    Wgpu,
    Cpu,
}

impl From<DeviceArg> for DeviceKind {
    fn from(d: DeviceArg) -> Self {
        match d {
            DeviceArg::Wgpu => DeviceKind::Wgpu,
            DeviceArg::Cpu  => DeviceKind::Cpu,
        }
    }
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Regime: 0 songs → songs, 1 joint, 2 joint → songs, 3 dual head
    #[arg(long, default_value_t = 1)]
    pub model_type: u8,

    /// Hidden layer width
    #[arg(long, default_value_t = 100)]
    pub dimension: usize,

    /// Number of full passes through the training playlists
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    #[arg(long, default_value_t = 256)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 0.001)]
    pub learning_rate: f64,

    /// Dropout probability after the encoder
    #[arg(long, default_value_t = 0.0)]
    pub dropout: f64,

    /// Prefetch threads for the data loaders (0 = load inline)
    #[arg(long, default_value_t = 4)]
    pub num_workers: usize,

    /// Song vocabulary: 0 by playlist frequency, 1 by like count
    #[arg(long, default_value_t = 0)]
    pub prep_method: u8,

    /// Minimum frequency (method 0) or kept fraction (method 1)
    #[arg(long, default_value_t = 2.0)]
    pub prep_method_thr: f64,

    /// Train on the submission data root and skip evaluation
    #[arg(long)]
    pub submit: bool,

    /// Regime 1 only: reconstruct songs, not tags
    #[arg(long)]
    pub song_only: bool,

    /// Workspace holding arena_data/, res/ and model/
    #[arg(long, default_value = ".")]
    pub data_dir: PathBuf,

    /// Evaluate on every N-th epoch
    #[arg(long, default_value_t = 5)]
    pub eval_every: usize,

    #[arg(long, default_value_t = 100)]
    pub song_top_k: usize,

    #[arg(long, default_value_t = 10)]
    pub tag_top_k: usize,

    #[arg(long, value_enum, default_value_t = DeviceArg::Wgpu)]
    pub device: DeviceArg,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// Fallible: the regime selector and vocabulary method are
/// checked here, before any file is read.
impl TryFrom<TrainArgs> for TrainConfig {
    type Error = anyhow::Error;

    fn try_from(a: TrainArgs) -> anyhow::Result<Self> {
        Ok(TrainConfig {
            regime:        Regime::from_selector(a.model_type, a.song_only)?,
            hidden_dim:    a.dimension,
            epochs:        a.epochs,
            batch_size:    a.batch_size,
            learning_rate: a.learning_rate,
            dropout:       a.dropout,
            num_workers:   a.num_workers,
            vocab_method:  VocabMethod::from_parts(a.prep_method, a.prep_method_thr)?,
            submit:        a.submit,
            eval_every:    a.eval_every,
            song_top_k:    a.song_top_k,
            tag_top_k:     a.tag_top_k,
            data_dir:      a.data_dir,
            device:        a.device.into(),
        })
    }
}

/// All arguments for the `evaluate` command
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Ground-truth answers
    #[arg(long, default_value = "arena_data/answers/sample_val.json")]
    pub gt: PathBuf,

    /// Candidate answers to score
    #[arg(long, default_value = "arena_data/results/results.json")]
    pub rec: PathBuf,

    #[arg(long, default_value_t = 100)]
    pub song_top_k: usize,

    #[arg(long, default_value_t = 10)]
    pub tag_top_k: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn train_args(extra: &[&str]) -> TrainArgs {
        let mut argv = vec!["playlist-ae", "train"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Train(args) => args,
            other => panic!("expected train, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_map_to_joint_frequency_run() {
        let cfg = TrainConfig::try_from(train_args(&[])).unwrap();
        assert_eq!(cfg.regime, Regime::Joint { song_only: false });
        assert_eq!(cfg.vocab_method, VocabMethod::Frequency { min_count: 2 });
        assert_eq!(cfg.hidden_dim, 100);
        assert_eq!(cfg.batch_size, 256);
        assert_eq!(cfg.device, DeviceKind::Wgpu);
        assert!(!cfg.submit);
    }

    #[test]
    fn test_flags_reach_config() {
        let cfg = TrainConfig::try_from(train_args(&[
            "--model-type", "3", "--dimension", "50", "--submit", "--device", "cpu",
            "--prep-method", "1", "--prep-method-thr", "0.5",
        ]))
        .unwrap();
        assert_eq!(cfg.regime, Regime::DualHead);
        assert_eq!(cfg.hidden_dim, 50);
        assert_eq!(cfg.vocab_method, VocabMethod::LikeCount { fraction: 0.5 });
        assert_eq!(cfg.device, DeviceKind::Cpu);
        assert!(cfg.submit);
    }

    #[test]
    fn test_unknown_model_type_rejected() {
        assert!(TrainConfig::try_from(train_args(&["--model-type", "4"])).is_err());
    }
}
