// ============================================================
// Layer 5 — Scorer
// ============================================================
// Runs a model over a whole split without touching parameters
// and reports loss / accuracy / ROC AUC. Used for per-epoch
// validation, the final held-out score, and `evaluate`.

use anyhow::Result;
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    prelude::*,
};
use std::sync::Arc;

use crate::data::batcher::{SentimentBatch, SentimentBatcher};
use crate::data::dataset::SentimentDataset;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::evaluation::{MetricAccumulator, SplitMetrics};
use crate::ml::model::{SentimentRnn, SentimentRnnConfig};

/// Sequential (unshuffled) loader over a whole split.
pub fn eval_loader<B: Backend>(
    dataset:    SentimentDataset,
    batch_size: usize,
    device:     B::Device,
) -> Arc<dyn DataLoader<SentimentBatch<B>>> {
    DataLoaderBuilder::new(SentimentBatcher::<B>::new(device))
        .batch_size(batch_size)
        .build(dataset)
}

pub fn score_split<B: Backend>(
    model:  &SentimentRnn<B>,
    loader: &dyn DataLoader<SentimentBatch<B>>,
) -> SplitMetrics {
    let mut acc = MetricAccumulator::default();

    for batch in loader.iter() {
        let labels        = labels_of(&batch.labels);
        let (loss, probs) = model.forward_loss(batch.tokens, batch.labels);
        let loss: f64     = loss.into_scalar().elem::<f64>();
        acc.push_batch(loss, &probs_of(probs), &labels);
    }

    acc.finish()
}

/// Rebuild the saved best model and score a split with it.
pub fn evaluate_checkpoint<B: Backend>(
    ckpt:       &CheckpointManager,
    model_cfg:  &SentimentRnnConfig,
    dataset:    SentimentDataset,
    batch_size: usize,
    device:     B::Device,
) -> Result<SplitMetrics> {
    model_cfg.validate()?;
    model_cfg.check_input(dataset.seq_len(), dataset.vocab_size(), None)?;

    let model: SentimentRnn<B> = model_cfg.init(&device);
    let model  = ckpt.load_model(model, &device)?;
    let loader = eval_loader::<B>(dataset, batch_size, device);

    Ok(score_split(&model, loader.as_ref()))
}

pub(crate) fn labels_of<B: Backend>(labels: &Tensor<B, 1, Int>) -> Vec<u8> {
    labels.to_data().iter::<i64>().map(|l| l as u8).collect()
}

pub(crate) fn probs_of<B: Backend>(probs: Tensor<B, 1>) -> Vec<f32> {
    probs.into_data().iter::<f32>().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sequence::{pad_sequences, PAD_TOKEN};
    use crate::domain::review::{Label, Review};
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn dataset(n: usize) -> SentimentDataset {
        let reviews: Vec<Review> = (0..n as u32).map(|i| Review::new(vec![1, 3 + i % 5])).collect();
        let labels: Vec<Label>   = (0..n).map(|i| if i % 2 == 0 { Label::Positive } else { Label::Negative }).collect();
        let matrix = pad_sequences(&reviews, 4, PAD_TOKEN).unwrap();
        SentimentDataset::new(&matrix, &labels, 10).unwrap()
    }

    #[test]
    fn test_scores_every_example_across_uneven_batches() {
        let device = Default::default();
        let model  = SentimentRnnConfig::new(10, 4, 3, 2).init::<TestBackend>(&device);
        let loader = eval_loader::<TestBackend>(dataset(7), 3, device);

        let m = score_split(&model, loader.as_ref());
        assert!(m.loss.is_finite() && m.loss > 0.0);
        assert!((0.0..=1.0).contains(&m.accuracy));
        assert!((0.0..=1.0).contains(&m.auc));
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let device = Default::default();
        let model  = SentimentRnnConfig::new(10, 4, 3, 2).init::<TestBackend>(&device);
        let a = score_split(&model, eval_loader::<TestBackend>(dataset(6), 4, Default::default()).as_ref());
        let b = score_split(&model, eval_loader::<TestBackend>(dataset(6), 4, Default::default()).as_ref());
        assert_eq!(a, b);
    }
}
