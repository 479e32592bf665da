// ============================================================
// Layer 5 — Classification Metrics
// ============================================================
// Loss, accuracy and ROC AUC over a whole split.
//
// ROC AUC is computed exactly from ranks (Mann–Whitney U):
//   AUC = (R+ − n+(n+ + 1)/2) / (n+ · n−)
// where R+ is the sum of the (1-based, tie-averaged) ranks of the
// positive examples. It is the probability that a random positive
// scores above a random negative; ties count one half.

use serde::{Deserialize, Serialize};

/// Loss / accuracy / AUC of one split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitMetrics {
    pub loss:     f64,
    pub accuracy: f64,
    /// NaN when the split holds a single class.
    pub auc:      f64,
}

/// `None` when either class is missing.
pub fn roc_auc(scores: &[f32], labels: &[u8]) -> Option<f64> {
    debug_assert_eq!(scores.len(), labels.len());

    let positives = labels.iter().filter(|&&l| l == 1).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut positive_rank_sum = 0.0f64;
    let mut start = 0usize;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        // ranks start+1 ..= end share their average
        let avg_rank = (start + 1 + end) as f64 / 2.0;
        let tied_positives = order[start..end].iter().filter(|&&i| labels[i] == 1).count();
        positive_rank_sum += avg_rank * tied_positives as f64;
        start = end;
    }

    let n_pos = positives as f64;
    let n_neg = negatives as f64;
    Some((positive_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}

/// Fraction of predictions on the correct side of 0.5.
pub fn binary_accuracy(probs: &[f32], labels: &[u8]) -> f64 {
    if probs.is_empty() {
        return f64::NAN;
    }
    let correct = probs
        .iter()
        .zip(labels)
        .filter(|&(&p, &l)| (p > 0.5) == (l == 1))
        .count();
    correct as f64 / probs.len() as f64
}

/// Collects batch results until a split is exhausted.
#[derive(Debug, Default)]
pub struct MetricAccumulator {
    weighted_loss: f64,
    scores:        Vec<f32>,
    labels:        Vec<u8>,
}

impl MetricAccumulator {
    /// `mean_loss` is the batch mean; it is weighted by batch size.
    pub fn push_batch(&mut self, mean_loss: f64, probs: &[f32], labels: &[u8]) {
        self.weighted_loss += mean_loss * probs.len() as f64;
        self.scores.extend_from_slice(probs);
        self.labels.extend_from_slice(labels);
    }

    pub fn samples(&self) -> usize {
        self.scores.len()
    }

    pub fn finish(&self) -> SplitMetrics {
        let loss = if self.scores.is_empty() {
            f64::NAN
        } else {
            self.weighted_loss / self.scores.len() as f64
        };
        SplitMetrics {
            loss,
            accuracy: binary_accuracy(&self.scores, &self.labels),
            auc:      roc_auc(&self.scores, &self.labels).unwrap_or(f64::NAN),
        }
    }
}
