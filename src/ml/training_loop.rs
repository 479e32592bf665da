// ============================================================
// Layer 5 — Epoch State Machine
// ============================================================
// Drives any `EpochRunner` through
//
//   Training ──► Validating ──► EarlyStopCheck ──► Training ...
//                                     │
//                                     └──► Done
//
// Done is reached when early stopping triggers, when max_epochs
// epochs have completed, or when the optional wall-clock limit
// has elapsed at an epoch boundary. On Done the runner is always
// restored to the snapshot of the best validation epoch.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::domain::error::PipelineError;
use crate::infra::metrics::EpochMetrics;
use crate::ml::early_stopping::{EarlyStopping, StopDecision};
use crate::ml::evaluation::SplitMetrics;

// ─── EpochRunner ──────────────────────────────────────────────────────────────
/// The capability the loop needs from a model + optimizer pair.
pub trait EpochRunner {
    type Snapshot;

    /// One full pass over the training batches, updating parameters.
    fn train_epoch(&mut self, epoch: usize) -> Result<SplitMetrics>;

    /// Metrics over the whole held-out split, no updates, no dropout.
    fn validate(&mut self) -> Result<SplitMetrics>;

    fn snapshot(&self) -> Self::Snapshot;

    fn restore(&mut self, snapshot: Self::Snapshot);
}

#[derive(Debug, Clone)]
pub struct TrainingLimits {
    pub max_epochs: usize,
    pub patience:   usize,
    pub min_delta:  f64,
    pub time_limit: Option<Duration>,
}

impl Default for TrainingLimits {
    fn default() -> Self {
        Self { max_epochs: 100, patience: 5, min_delta: 0.0, time_limit: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    EarlyStopped,
    MaxEpochs,
    TimeLimit,
}

#[derive(Debug)]
enum Phase {
    Training,
    Validating { train: SplitMetrics },
    EarlyStopCheck { train: SplitMetrics, val: SplitMetrics },
    Done(StopReason),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub history:     Vec<EpochMetrics>,
    pub best_epoch:  usize,
    pub best_score:  f64,
    pub stop_reason: StopReason,
}

/// Run epochs until Done; `on_epoch` sees every history row as it is appended.
pub fn run_epochs<R, F>(
    runner:       &mut R,
    limits:       &TrainingLimits,
    mut on_epoch: F,
) -> Result<TrainingReport>
where
    R: EpochRunner,
    F: FnMut(&EpochMetrics) -> Result<()>,
{
    if limits.max_epochs == 0 {
        return Err(PipelineError::config("max_epochs must be > 0").into());
    }

    let started     = Instant::now();
    let mut stopper = EarlyStopping::new(limits.patience).with_min_delta(limits.min_delta);
    let mut history = Vec::new();
    let mut epoch   = 1usize;
    let mut phase   = Phase::Training;

    let stop_reason = loop {
        phase = match phase {
            Phase::Training => {
                tracing::debug!("Epoch {}: training", epoch);
                let train = runner.train_epoch(epoch)?;
                Phase::Validating { train }
            }

            Phase::Validating { train } => {
                tracing::debug!("Epoch {}: validating", epoch);
                let val = runner.validate()?;
                Phase::EarlyStopCheck { train, val }
            }

            Phase::EarlyStopCheck { train, val } => {
                let record = EpochMetrics::from_splits(epoch, &train, &val);
                on_epoch(&record)?;
                history.push(record);

                let decision = stopper.observe(epoch, val.auc, || runner.snapshot());
                if let StopDecision::NoImprovement { wait } = decision {
                    tracing::debug!("No val_auc improvement for {} epoch(s)", wait);
                }

                if decision == StopDecision::Stop {
                    Phase::Done(StopReason::EarlyStopped)
                } else if epoch >= limits.max_epochs {
                    Phase::Done(StopReason::MaxEpochs)
                } else if limits.time_limit.is_some_and(|limit| started.elapsed() >= limit) {
                    Phase::Done(StopReason::TimeLimit)
                } else {
                    epoch += 1;
                    Phase::Training
                }
            }

            Phase::Done(reason) => break reason,
        };
    };

    let (best_epoch, best_score, snapshot) = stopper
        .into_best()
        .ok_or_else(|| anyhow!("training finished without a completed epoch"))?;
    runner.restore(snapshot);

    tracing::info!(
        "Training stopped ({:?}) after {} epoch(s); restored epoch {} (val_auc={:.4})",
        stop_reason,
        history.len(),
        best_epoch,
        best_score,
    );

    Ok(TrainingReport { history, best_epoch, best_score, stop_reason })
}
