// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights and optimizer state with a
// full-precision MessagePack file recorder.
//
// One checkpoint = two files next to each other:
//
//   model/autoencoder_var_100_256_0.001_0_0_2_val.mpk         weights
//   model/autoencoder_var_100_256_0.001_0_0_2_val.optim.mpk   Adam moments
//
// The stem encodes the whole training configuration, so a run
// with the same settings resumes, and any change starts a new
// lineage. Both files are overwritten after every epoch.
//
// Loading never fails the run: the caller gets a LoadOutcome
// and decides. Saving propagates every error.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    optim::Optimizer,
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::ml::model::AutoEncoder;

/// Result of a best-effort checkpoint load.
#[derive(Debug)]
pub enum LoadOutcome<T> {
    Loaded(T),
    /// No checkpoint at the path
    NotFound,
    /// A file exists but cannot be used
    Corrupt(String),
}

type CheckpointRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

/// Manages one checkpoint lineage.
pub struct CheckpointManager {
    /// Weights file, `<stem>.mpk`
    model_path: PathBuf,
    /// Optimizer file, `<stem>.optim.mpk`
    optim_path: PathBuf,
}

impl CheckpointManager {
    /// `model_path` must end in `.mpk`: the recorder replaces the
    /// extension, and the stems contain dots (learning rate).
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        let model_path: PathBuf = model_path.into();
        let optim_path = model_path.with_extension("optim.mpk");
        Self { model_path, optim_path }
    }

    pub fn path(&self) -> &Path {
        &self.model_path
    }

    /// Overwrite the checkpoint with the current model and optimizer.
    pub fn save<B, O>(&self, model: &AutoEncoder<B>, optim: &O) -> Result<()>
    where
        B: AutodiffBackend,
        O: Optimizer<AutoEncoder<B>, B>,
    {
        if let Some(parent) = self.model_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create checkpoint directory '{}'", parent.display()))?;
        }

        let recorder = CheckpointRecorder::new();
        Recorder::<B>::record(&recorder, model.clone().into_record(), self.model_path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", self.model_path.display()))?;

        Recorder::<B>::record(&recorder, optim.to_record(), self.optim_path.clone())
            .with_context(|| format!("Failed to save optimizer state to '{}'", self.optim_path.display()))?;

        tracing::debug!("Saved checkpoint '{}'", self.model_path.display());
        Ok(())
    }

    /// Load weights into a copy of `model`.
    ///
    /// The freshly built `model` fixes the expected layer shapes;
    /// a checkpoint with different shapes is `Corrupt`.
    pub fn load_model<B: Backend>(&self, model: &AutoEncoder<B>, device: &B::Device) -> LoadOutcome<AutoEncoder<B>> {
        if !self.model_path.exists() {
            return LoadOutcome::NotFound;
        }

        let recorder = CheckpointRecorder::new();
        let record = match Recorder::<B>::load(&recorder, self.model_path.clone(), device) {
            Ok(record) => record,
            Err(e)     => return LoadOutcome::Corrupt(format!("{e:?}")),
        };

        let loaded = model.clone().load_record(record);
        if loaded.shape_signature() != model.shape_signature() {
            return LoadOutcome::Corrupt(format!(
                "layer shapes {:?} do not match the configured model {:?}",
                loaded.shape_signature(),
                model.shape_signature()
            ));
        }
        LoadOutcome::Loaded(loaded)
    }

    /// Restore optimizer state saved next to the weights.
    ///
    /// Only called after the weights were loaded. A missing or
    /// unreadable optimizer file does not reject the checkpoint:
    /// `optim` comes back unchanged and Adam starts fresh.
    pub fn load_optimizer<B, O>(&self, optim: O, device: &B::Device) -> O
    where
        B: AutodiffBackend,
        O: Optimizer<AutoEncoder<B>, B>,
    {
        if !self.optim_path.exists() {
            tracing::warn!("No optimizer state next to '{}'; starting Adam fresh", self.model_path.display());
            return optim;
        }

        let recorder = CheckpointRecorder::new();
        match Recorder::<B>::load::<O::Record>(&recorder, self.optim_path.clone(), device) {
            Ok(record) => optim.load_record(record),
            Err(e) => {
                tracing::warn!("Ignoring unreadable optimizer state '{}': {e:?}", self.optim_path.display());
                optim
            }
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{regime::Regime, vocab::VocabSizes};
    use crate::ml::model::AutoEncoderConfig;
    use burn::backend::{Autodiff, NdArray};
    use burn::optim::AdamConfig;

    type TestBackend = Autodiff<NdArray<f32>>;

    const SIZES: VocabSizes = VocabSizes { songs: 6, tags: 4 };

    fn weights<B: Backend>(m: &AutoEncoder<B>) -> Vec<f32> {
        let mut all = m.encoder.weight.val().into_data().to_vec::<f32>().unwrap();
        all.extend(m.head.weight.val().into_data().to_vec::<f32>().unwrap());
        all
    }

    #[test]
    fn test_missing_checkpoint_is_not_found() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let model: AutoEncoder<TestBackend> =
            AutoEncoderConfig::for_regime(Regime::SongAutoEncoder, SIZES, 4, 0.0).init(&device);
        let ckpt = CheckpointManager::new(dir.path().join("model.mpk"));
        assert!(matches!(ckpt.load_model(&model, &device), LoadOutcome::NotFound));
    }

    #[test]
    fn test_save_then_load_reproduces_weights() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let config = AutoEncoderConfig::for_regime(Regime::DualHead, SIZES, 4, 0.0);
        let model: AutoEncoder<TestBackend> = config.init(&device);
        let optim = AdamConfig::new().init::<TestBackend, AutoEncoder<TestBackend>>();

        let ckpt = CheckpointManager::new(dir.path().join("nested").join("ae_0.001.mpk"));
        ckpt.save(&model, &optim).unwrap();
        assert!(ckpt.path().exists());
        assert!(dir.path().join("nested").join("ae_0.001.optim.mpk").exists());

        // A differently initialised model of the same shape
        let fresh: AutoEncoder<TestBackend> = config.init(&device);
        match ckpt.load_model(&fresh, &device) {
            LoadOutcome::Loaded(restored) => assert_eq!(weights(&restored), weights(&model)),
            LoadOutcome::NotFound     => panic!("checkpoint not found after save"),
            LoadOutcome::Corrupt(why) => panic!("checkpoint rejected: {why}"),
        }

        // Optimizer state restores from the sibling file
        let _optim = ckpt.load_optimizer::<TestBackend, _>(optim, &device);
    }

    #[test]
    fn test_garbage_file_is_corrupt() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let path   = dir.path().join("model.mpk");
        fs::write(&path, b"not a checkpoint").unwrap();

        let model: AutoEncoder<TestBackend> =
            AutoEncoderConfig::for_regime(Regime::SongAutoEncoder, SIZES, 4, 0.0).init(&device);
        let ckpt = CheckpointManager::new(&path);
        assert!(matches!(ckpt.load_model(&model, &device), LoadOutcome::Corrupt(_)));
    }

    #[test]
    fn test_other_vocabulary_is_corrupt() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let ckpt   = CheckpointManager::new(dir.path().join("model.mpk"));

        let small: AutoEncoder<TestBackend> =
            AutoEncoderConfig::for_regime(Regime::SongAutoEncoder, SIZES, 4, 0.0).init(&device);
        let optim = AdamConfig::new().init::<TestBackend, AutoEncoder<TestBackend>>();
        ckpt.save(&small, &optim).unwrap();

        let bigger = VocabSizes { songs: 9, tags: 4 };
        let model: AutoEncoder<TestBackend> =
            AutoEncoderConfig::for_regime(Regime::SongAutoEncoder, bigger, 4, 0.0).init(&device);
        assert!(matches!(ckpt.load_model(&model, &device), LoadOutcome::Corrupt(_)));
    }
}
