// ============================================================
// Layer 4 — Sentiment Batcher
// ============================================================
// Implements Burn's Batcher trait to stack SentimentItems into
// tensors on the target device.
//
//   Input:  Vec of N items, each with L token ids
//   Output: tokens [N, L] (Int), labels [N] (Int)
//
// Rows are already padded to the same width by the normalizer,
// so batching is a flatten + reshape.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::SentimentItem;

// ─── SentimentBatch ───────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct SentimentBatch<B: Backend> {
    /// Padded token ids — shape: [batch_size, seq_len]
    pub tokens: Tensor<B, 2, Int>,

    /// 0 = negative, 1 = positive — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

// ─── SentimentBatcher ─────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct SentimentBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SentimentBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<SentimentItem, SentimentBatch<B>> for SentimentBatcher<B> {
    fn batch(&self, items: Vec<SentimentItem>) -> SentimentBatch<B> {
        let batch_size = items.len();
        let seq_len    = items.first().map_or(0, |i| i.tokens.len());

        let tokens_flat: Vec<i32> = items
            .iter()
            .flat_map(|i| i.tokens.iter().map(|&t| t as i32))
            .collect();

        let labels: Vec<i32> = items.iter().map(|i| i.label as i32).collect();

        let tokens = Tensor::<B, 1, Int>::from_ints(
            tokens_flat.as_slice(), &self.device
        ).reshape([batch_size, seq_len]);

        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        SentimentBatch { tokens, labels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes_and_values() {
        let device  = Default::default();
        let batcher = SentimentBatcher::<NdArray>::new(device);
        let batch   = batcher.batch(vec![
            SentimentItem { tokens: vec![0, 1, 5], label: 1 },
            SentimentItem { tokens: vec![1, 7, 8], label: 0 },
        ]);

        assert_eq!(batch.tokens.dims(), [2, 3]);
        assert_eq!(batch.labels.dims(), [2]);

        let tokens: Vec<i64> = batch.tokens.into_data().iter::<i64>().collect();
        assert_eq!(tokens, vec![0, 1, 5, 1, 7, 8]);
        let labels: Vec<i64> = batch.labels.into_data().iter::<i64>().collect();
        assert_eq!(labels, vec![1, 0]);
    }
}
