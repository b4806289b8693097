// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses arguments with
// clap and delegates all work to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`    — trains one regime, resuming from its checkpoint
//   2. `evaluate` — scores an answer file against the ground truth
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, TrainArgs};

use crate::application::train_use_case::TrainConfig;

#[derive(Parser, Debug)]
#[command(
    name = "playlist-ae",
    version = "0.1.0",
    about = "Train autoencoders for playlist continuation and score their recommendations."
)]
pub struct Cli {
    /// The subcommand to run (train or evaluate)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route the subcommand to its use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => Self::run_train(args),
            Commands::Evaluate(args) => Self::run_evaluate(args),
        }
    }

    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        // Invalid regime or vocabulary settings stop here
        let config = TrainConfig::try_from(args)?;
        tracing::info!("Configuration: {}", serde_json::to_string(&config)?);

        TrainUseCase::new(config).execute()?;

        println!("train completed");
        Ok(())
    }

    fn run_evaluate(args: EvaluateArgs) -> Result<()> {
        use crate::application::evaluate_use_case::EvaluateUseCase;

        let use_case = EvaluateUseCase::new(args.gt, args.rec, args.song_top_k, args.tag_top_k);
        let score = use_case.execute()?;
        println!("{score}");
        Ok(())
    }
}
