// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Validate the configuration        (Layer 2)
//   Step 2: Load training playlists            (Layer 4 - data)
//   Step 3: Ensure tag + song vocabularies     (Layer 6 - infra)
//   Step 4: Build membership datasets          (Layer 4 - data)
//   Step 5: Open the checkpoint lineage        (Layer 6 - infra)
//   Step 6: Run the training loop              (Layer 5 - ml)
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::data::{dataset::MembershipDataset, loader::PlaylistLoader};
use crate::domain::{
    answer::TAG_PLACEHOLDER,
    regime::Regime,
    traits::PlaylistSource,
    vocab::VocabMethod,
};
use crate::infra::{
    checkpoint::CheckpointManager,
    evaluator::ArenaEvaluator,
    vocab_store::VocabStore,
};
use crate::ml::trainer::{run_training, TrainingPlan};

// ─── Device ───────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceKind {
    /// GPU through WGPU
    Wgpu,
    /// Host memory through ndarray
    Cpu,
}

// ─── Training Configuration ──────────────────────────────────────────────────
// Every setting of a run. Built once from the CLI and only
// ever borrowed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub regime:        Regime,
    pub hidden_dim:    usize,
    pub epochs:        usize,
    pub batch_size:    usize,
    pub learning_rate: f64,
    pub dropout:       f64,
    pub num_workers:   usize,
    pub vocab_method:  VocabMethod,
    pub submit:        bool,
    /// Evaluate on epochs divisible by this
    pub eval_every:    usize,
    pub song_top_k:    usize,
    pub tag_top_k:     usize,
    /// Workspace root every data path is resolved against
    pub data_dir:      PathBuf,
    pub device:        DeviceKind,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            regime:        Regime::Joint { song_only: false },
            hidden_dim:    100,
            epochs:        10,
            batch_size:    256,
            learning_rate: 0.001,
            dropout:       0.0,
            num_workers:   4,
            vocab_method:  VocabMethod::Frequency { min_count: 2 },
            submit:        false,
            eval_every:    5,
            song_top_k:    100,
            tag_top_k:     10,
            data_dir:      PathBuf::from("."),
            device:        DeviceKind::Wgpu,
        }
    }
}

/// Every file a run touches.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPaths {
    /// Holds train.json and the vocabulary files
    pub data_root:        PathBuf,
    pub train_file:       PathBuf,
    pub question_file:    PathBuf,
    /// Ground-truth answers for the question file
    pub answer_file:      PathBuf,
    pub temp_answer_file: PathBuf,
    pub model_dir:        PathBuf,
}

impl DataPaths {
    pub fn resolve(base: &Path, submit: bool) -> Self {
        let (data_root, question_file) = if submit {
            (base.join("res"), base.join("res").join("val.json"))
        } else {
            (
                base.join("arena_data").join("orig"),
                base.join("arena_data").join("questions").join("sample_val.json"),
            )
        };
        let answers = base.join("arena_data").join("answers");
        Self {
            train_file:       data_root.join("train.json"),
            data_root,
            question_file,
            answer_file:      answers.join("sample_val.json"),
            temp_answer_file: answers.join("temp.json"),
            model_dir:        base.join("model"),
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.hidden_dim > 0, "hidden dimension must be positive");
        anyhow::ensure!(self.batch_size > 0, "batch size must be positive");
        anyhow::ensure!(self.eval_every > 0, "evaluation cadence must be positive");
        anyhow::ensure!(self.song_top_k > 0, "song top-k must be positive");
        anyhow::ensure!(
            self.learning_rate > 0.0 && self.learning_rate.is_finite(),
            "learning rate must be a positive number, got {}", self.learning_rate
        );
        anyhow::ensure!(
            (0.0..1.0).contains(&self.dropout),
            "dropout must be in [0, 1), got {}", self.dropout
        );
        Ok(())
    }

    pub fn paths(&self) -> DataPaths {
        DataPaths::resolve(&self.data_dir, self.submit)
    }

    /// `<model_dir>/<prefix>_<H>_<batch>_<lr>_<dropout>_<method>_<thr>_<mode>.mpk`
    ///
    /// Identical settings resume the same file; changing any of
    /// them starts a separate lineage.
    pub fn checkpoint_path(&self) -> PathBuf {
        let mode = if self.submit { "sub" } else { "val" };
        let name = format!(
            "{}_{}_{}_{}_{}_{}_{}_{}.mpk",
            self.regime.checkpoint_prefix(),
            self.hidden_dim,
            self.batch_size,
            self.learning_rate,
            self.dropout,
            self.vocab_method.index(),
            self.vocab_method.threshold_label(),
            mode,
        );
        self.paths().model_dir.join(name)
    }

    /// Validation runs evaluate every `eval_every` epochs, starting at 0.
    pub fn should_evaluate(&self, epoch: usize) -> bool {
        !self.submit && epoch % self.eval_every == 0
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1: Reject bad settings before touching any file ──────────────
        cfg.validate()?;
        let paths = cfg.paths();
        tracing::info!("Training {:?} with data root '{}'", cfg.regime, paths.data_root.display());

        // ── Step 2: Load the raw training playlists ───────────────────────────
        let train_playlists = PlaylistLoader::new(&paths.train_file).load_all()?;

        // ── Step 3: Vocabularies ──────────────────────────────────────────────
        // The tag vocabulary is ensured for every regime, even
        // the song-only one, so all regimes share one id space.
        let store      = VocabStore::new(&paths.data_root);
        let tag_vocab  = store.load_or_build_tags(&train_playlists)?;
        let song_vocab = store.load_or_build_songs(&train_playlists, cfg.vocab_method)?;
        anyhow::ensure!(!song_vocab.is_empty(), "song vocabulary is empty; lower the threshold");
        anyhow::ensure!(
            !cfg.regime.uses_tags() || !tag_vocab.is_empty(),
            "regime {:?} needs tags but the training playlists carry none",
            cfg.regime
        );

        // ── Step 4: Datasets ──────────────────────────────────────────────────
        let input_tags = cfg.regime.uses_tags().then_some(&tag_vocab);
        let train = Arc::new(MembershipDataset::build(&train_playlists, &song_vocab, input_tags));
        tracing::info!(
            "Training set: {} playlists, input width {}",
            train.sample_count(),
            train.input_width()
        );

        // Submit runs never evaluate, so the question file is not needed
        let questions = if cfg.submit {
            None
        } else {
            let playlists = PlaylistLoader::new(&paths.question_file).load_all()?;
            let ds = MembershipDataset::build(&playlists, &song_vocab, input_tags);
            tracing::info!("Question set: {} playlists", ds.sample_count());
            Some(Arc::new(ds))
        };

        // ── Step 5: Checkpoint lineage ────────────────────────────────────────
        let checkpoint = CheckpointManager::new(cfg.checkpoint_path());
        tracing::info!("Checkpoint: '{}'", checkpoint.path().display());

        // ── Step 6: Training loop (Layer 5) ───────────────────────────────────
        let plan = TrainingPlan {
            config: cfg,
            sizes: train.sizes(),
            train,
            questions,
            songs: song_vocab.lookup(),
            tags: tag_vocab.lookup(),
            checkpoint: &checkpoint,
        };
        let scorer = ArenaEvaluator::new(cfg.song_top_k, cfg.tag_top_k.max(TAG_PLACEHOLDER.len()));
        run_training(&plan, &scorer)
    }
}
