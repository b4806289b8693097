// ============================================================
// Layer 5 — Training Loop
// ============================================================
// One loop skeleton shared by every regime. The regime only
// decides three things: the head layout of the model, how the
// batch loss is composed, and which tensors are decoded into
// recommendations.
//
// Backend split:
//   - training runs on B (an AutodiffBackend) so loss.backward()
//     has a graph to walk
//   - model.valid() moves the model to B::InnerBackend: no graph,
//     dropout off, so evaluation is a pure read
//   - the question loader is built on the inner backend too
//
// Per epoch:
//   1. shuffled mini-batches → forward → loss → backward → Adam
//   2. print "loss: <epoch> <percent>% <running loss>"
//   3. overwrite the checkpoint
//   4. on cadence epochs, score the question set
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use std::{path::Path, sync::Arc};

use crate::application::train_use_case::{DeviceKind, TrainConfig};
use crate::data::{
    batcher::{MembershipBatch, MembershipBatcher},
    dataset::MembershipDataset,
};
use crate::domain::{
    answer::{AnswerRecord, EvalScore},
    regime::Regime,
    traits::AnswerScorer,
    vocab::VocabSizes,
};
use crate::infra::{
    answer_file::{remove_stale, TempAnswerFile},
    checkpoint::{CheckpointManager, LoadOutcome},
};
use crate::ml::{
    model::{AutoEncoder, AutoEncoderConfig},
    objective::{decode_heads, regime_loss},
    recommender::extract,
};

type GpuBackend = burn::backend::Autodiff<burn::backend::Wgpu>;
type CpuBackend = burn::backend::Autodiff<burn::backend::NdArray>;

/// Everything a run needs, prepared by the application layer.
pub struct TrainingPlan<'a> {
    pub config:     &'a TrainConfig,
    pub sizes:      VocabSizes,
    pub train:      Arc<MembershipDataset>,
    /// `None` in submit runs, which never evaluate
    pub questions:  Option<Arc<MembershipDataset>>,
    /// Dense song id → original song id
    pub songs:      &'a [u64],
    /// Dense tag id → tag
    pub tags:       &'a [String],
    pub checkpoint: &'a CheckpointManager,
}

pub fn run_training<S: AnswerScorer>(plan: &TrainingPlan<'_>, scorer: &S) -> Result<()> {
    match plan.config.device {
        DeviceKind::Wgpu => {
            let device = burn::backend::wgpu::WgpuDevice::default();
            tracing::info!("Using WGPU device: {:?}", device);
            train_loop::<GpuBackend, S>(plan, scorer, &device)?;
        }
        DeviceKind::Cpu => {
            let device = burn::backend::ndarray::NdArrayDevice::Cpu;
            tracing::info!("Using ndarray device: {:?}", device);
            train_loop::<CpuBackend, S>(plan, scorer, &device)?;
        }
    }
    Ok(())
}

pub fn train_loop<B, S>(plan: &TrainingPlan<'_>, scorer: &S, device: &B::Device) -> Result<AutoEncoder<B>>
where
    B: AutodiffBackend,
    S: AnswerScorer,
{
    let cfg    = plan.config;
    let regime = cfg.regime;
    let sizes  = plan.sizes;
    let paths  = cfg.paths();

    // ── Build model + Adam ────────────────────────────────────────────────────
    let model_cfg = AutoEncoderConfig::for_regime(regime, sizes, cfg.hidden_dim, cfg.dropout);
    let fresh: AutoEncoder<B> = model_cfg.init(device);
    let optim = AdamConfig::new().init::<B, AutoEncoder<B>>();

    // ── Resume (best effort) ──────────────────────────────────────────────────
    let (mut model, mut optim) = match plan.checkpoint.load_model(&fresh, device) {
        LoadOutcome::Loaded(model) => {
            println!("\n--------model restored--------\n");
            let optim = plan.checkpoint.load_optimizer::<B, _>(optim, device);
            (model, optim)
        }
        LoadOutcome::NotFound => {
            println!("\n--------model not restored--------\n");
            tracing::info!("No checkpoint at '{}'", plan.checkpoint.path().display());
            (fresh, optim)
        }
        LoadOutcome::Corrupt(why) => {
            println!("\n--------model not restored--------\n");
            tracing::warn!("Ignoring checkpoint '{}': {why}", plan.checkpoint.path().display());
            (fresh, optim)
        }
    };

    // A crashed run may have left its answers behind
    remove_stale(&paths.temp_answer_file)?;

    // ── Data loaders ──────────────────────────────────────────────────────────
    let train_loader = build_loader::<B>(
        plan.train.clone(), cfg.batch_size, cfg.num_workers, true, device,
    );
    let question_loader = plan.questions.as_ref().map(|q| {
        build_loader::<B::InnerBackend>(q.clone(), cfg.batch_size, cfg.num_workers, false, device)
    });

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 0..cfg.epochs {
        println!();
        println!("epoch: {epoch}");

        let mut running_loss = 0.0f64;
        for batch in train_loader.iter() {
            let output = model.forward(batch.inputs.clone());
            let loss   = regime_loss(regime, sizes, batch.inputs, output)?;
            running_loss += loss.value();

            // Dual head: the summed loss back-propagates each head's
            // own gradient, then one Adam step applies both.
            let grads = loss.total().backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.learning_rate, model, grads);
        }

        println!(
            "loss: {} {}% {:.4}",
            epoch,
            epoch * 100 / cfg.epochs,
            running_loss
        );
        plan.checkpoint.save(&model, &optim)?;

        // ── Periodic evaluation ───────────────────────────────────────────────
        if let Some(loader) = question_loader.as_ref().filter(|_| cfg.should_evaluate(epoch)) {
            let records = collect_answers(
                &model.valid(),
                loader.as_ref(),
                regime,
                sizes,
                plan.songs,
                plan.tags,
                cfg.song_top_k,
                cfg.tag_top_k,
            )?;
            let score = score_answers(&records, &paths.temp_answer_file, &paths.answer_file, scorer)?;
            println!("{score}");
        }
    }

    Ok(model)
}

/// Loader over `dataset` producing batches on backend `Bk`.
///
/// Workers only prefetch. With workers, batches arrive in
/// completion order, not dataset order.
pub fn build_loader<Bk: Backend>(
    dataset:     Arc<MembershipDataset>,
    batch_size:  usize,
    num_workers: usize,
    shuffle:     bool,
    device:      &Bk::Device,
) -> Arc<dyn DataLoader<MembershipBatch<Bk>>> {
    let sizes   = dataset.sizes();
    let batcher = MembershipBatcher::<Bk>::new(device.clone(), sizes.songs, dataset.input_width());

    let mut builder = DataLoaderBuilder::new(batcher).batch_size(batch_size);
    if shuffle {
        builder = builder.shuffle(rand::random::<u64>());
    }
    if num_workers > 0 {
        builder = builder.num_workers(num_workers);
    }
    builder.build(dataset)
}

/// One answer record per question playlist, sorted by playlist id.
///
/// Loader workers deliver batches in completion order, so the
/// records are sorted before they are handed back.
#[allow(clippy::too_many_arguments)]
pub fn collect_answers<Bi: Backend>(
    model:  &AutoEncoder<Bi>,
    loader: &dyn DataLoader<MembershipBatch<Bi>>,
    regime: Regime,
    sizes:  VocabSizes,
    songs:  &[u64],
    tags:   &[String],
    song_k: usize,
    tag_k:  usize,
) -> Result<Vec<AnswerRecord>> {
    let mut records = Vec::new();

    for batch in loader.iter() {
        let output = model.forward(batch.inputs.clone());
        let plan   = decode_heads(regime, sizes, batch.inputs, output)?;

        let song_lists = extract(plan.songs, songs, song_k)?;
        let tag_lists = match plan.tags {
            Some(pair) => extract(pair, tags, tag_k)?,
            None       => vec![AnswerRecord::placeholder_tags(); batch.ids.len()],
        };

        records.extend(
            batch.ids.into_iter()
                .zip(song_lists)
                .zip(tag_lists)
                .map(|((id, s), t)| AnswerRecord::new(id, s, t)),
        );
    }

    records.sort_by_key(|r| r.id);
    Ok(records)
}

/// Write `records` to `temp_path`, score them, and remove the file
/// again whether or not scoring succeeded.
pub fn score_answers<S: AnswerScorer>(
    records:      &[AnswerRecord],
    temp_path:    &Path,
    ground_truth: &Path,
    scorer:       &S,
) -> Result<EvalScore> {
    let temp = TempAnswerFile::write(temp_path, records)?;
    scorer.score(ground_truth, temp.path())
}
