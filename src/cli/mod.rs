// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with `clap`.
// All work is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`    — trains the classifier and saves the best epoch
//   2. `evaluate` — re-scores that checkpoint on the test split
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "imdb-gru-sentiment",
    version = "0.1.0",
    about = "Train a GRU sentiment classifier on a pre-tokenized review corpus."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the use case for the chosen subcommand.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Evaluate(args) => run_evaluate(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on corpus: {}", args.corpus);

    let outcome = TrainUseCase::new(args.into()).execute()?;

    println!(
        "\nBest epoch {} of {} ({:?})",
        outcome.report.best_epoch,
        outcome.report.history.len(),
        outcome.report.stop_reason,
    );
    println!("Final held-out AUC: {:.4}", outcome.final_metrics.auc);
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let use_case = EvaluateUseCase::new(
        args.checkpoint_dir,
        args.corpus,
        args.backend.map(Into::into),
    );

    let m = use_case.execute()?;
    println!(
        "\nHeld-out loss: {:.4} | accuracy: {:.1}% | AUC: {:.4}",
        m.loss,
        m.accuracy * 100.0,
        m.auc,
    );
    Ok(())
}
