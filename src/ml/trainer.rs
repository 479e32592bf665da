// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Binds the model, Adam and the two data loaders to the epoch
// state machine in `training_loop`.
//
// Backends:
//   - training runs on B (an AutodiffBackend) so gradients flow
//   - model.valid() returns the model on B::InnerBackend with
//     dropout and recurrent dropout switched off
//   - the validation batcher therefore also uses B::InnerBackend
//
// After Done the runner holds the best-epoch parameters; those
// are scored once more on the held-out split and checkpointed.
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
use std::sync::Arc;

use crate::application::train_use_case::TrainConfig;
use crate::data::batcher::{SentimentBatch, SentimentBatcher};
use crate::data::dataset::SentimentDataset;
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::evaluation::{MetricAccumulator, SplitMetrics};
use crate::ml::model::SentimentRnn;
use crate::ml::scorer::{eval_loader, labels_of, probs_of, score_split};
use crate::ml::training_loop::{run_epochs, EpochRunner, TrainingReport};

/// What a finished run hands back to the application layer.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub report:        TrainingReport,
    /// Held-out metrics of the restored best model.
    pub final_metrics: SplitMetrics,
}

// ─── BurnRunner ───────────────────────────────────────────────────────────────
struct BurnRunner<B: AutodiffBackend, O> {
    model:        SentimentRnn<B>,
    optim:        O,
    lr:           f64,
    train_loader: Arc<dyn DataLoader<SentimentBatch<B>>>,
    valid_loader: Arc<dyn DataLoader<SentimentBatch<B::InnerBackend>>>,
}

impl<B, O> EpochRunner for BurnRunner<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<SentimentRnn<B>, B>,
{
    type Snapshot = SentimentRnn<B>;

    fn train_epoch(&mut self, epoch: usize) -> Result<SplitMetrics> {
        let mut acc = MetricAccumulator::default();

        for batch in self.train_loader.iter() {
            let labels        = labels_of(&batch.labels);
            let (loss, probs) = self.model.forward_loss(batch.tokens, batch.labels);

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            acc.push_batch(loss_val, &probs_of(probs), &labels);

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &self.model);
            self.model = self.optim.step(self.lr, self.model.clone(), grads);
        }

        tracing::debug!("Epoch {}: {} training samples", epoch, acc.samples());
        Ok(acc.finish())
    }

    fn validate(&mut self) -> Result<SplitMetrics> {
        Ok(score_split(&self.model.valid(), self.valid_loader.as_ref()))
    }

    fn snapshot(&self) -> SentimentRnn<B> {
        self.model.clone()
    }

    fn restore(&mut self, snapshot: SentimentRnn<B>) {
        self.model = snapshot;
    }
}

/// Train on `train_dataset`, early-stop on `val_dataset` AUC, checkpoint
/// the best model and report its held-out metrics.
pub fn run_training<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    train_dataset: SentimentDataset,
    val_dataset:   SentimentDataset,
    ckpt:          &CheckpointManager,
    metrics:       &MetricsLogger,
    device:        B::Device,
) -> Result<TrainingOutcome> {
    B::seed(cfg.seed);

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = cfg.model_config(train_dataset.vocab_size());
    model_cfg.validate()?;
    for dataset in [&train_dataset, &val_dataset] {
        model_cfg.check_input(dataset.seq_len(), dataset.vocab_size(), None)?;
    }
    let model: SentimentRnn<B> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: vocab={}, embedding_dim={}, hidden_size={}, dropout={}/{}",
        model_cfg.vocab_size,
        model_cfg.embedding_dim,
        model_cfg.hidden_size,
        model_cfg.dropout,
        model_cfg.recurrent_dropout,
    );

    // ── Data loaders ──────────────────────────────────────────────────────────
    let train_loader = DataLoaderBuilder::new(SentimentBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .build(train_dataset);
    let valid_loader = eval_loader::<B::InnerBackend>(val_dataset, cfg.batch_size, device);

    let mut runner = BurnRunner {
        model,
        optim: AdamConfig::new().init::<B, SentimentRnn<B>>(),
        lr: cfg.lr,
        train_loader,
        valid_loader,
    };

    // ── Epoch loop ────────────────────────────────────────────────────────────
    let limits = cfg.limits();
    let report = run_epochs(&mut runner, &limits, |m| {
        println!(
            "Epoch {:>3}/{} | loss={:.4} acc={:.1}% auc={:.4} | val_loss={:.4} val_acc={:.1}% val_auc={:.4}",
            m.epoch, limits.max_epochs,
            m.loss, m.accuracy * 100.0, m.auc,
            m.val_loss, m.val_accuracy * 100.0, m.val_auc,
        );
        metrics.log(m)
    })?;

    // ── Final held-out score of the restored model ────────────────────────────
    let final_metrics = score_split(&runner.model.valid(), runner.valid_loader.as_ref());
    ckpt.save_model(&runner.model, report.best_epoch)?;
    tracing::info!(
        "Best epoch {} checkpointed; held-out AUC {:.4}",
        report.best_epoch,
        final_metrics.auc,
    );

    Ok(TrainingOutcome { report, final_metrics })
}
