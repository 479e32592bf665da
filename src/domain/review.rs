// ============================================================
// Layer 3 — Review Domain Types
// ============================================================
// A review is an ordered list of vocabulary indices; a label
// says whether the review is negative (0) or positive (1).
//
// Plain data only: no tensors, no file I/O.
//
// Reference: Rust Book §5 (Structs), §6 (Enums)

use serde::{Deserialize, Serialize};

use crate::domain::error::PipelineError;

/// One pre-tokenized review. Token 0 is reserved for padding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub tokens: Vec<u32>,
}

impl Review {
    pub fn new(tokens: Vec<u32>) -> Self {
        Self { tokens }
    }
}

/// Binary sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Label {
    Negative = 0,
    Positive = 1,
}

impl Label {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_positive(self) -> bool {
        matches!(self, Label::Positive)
    }
}

impl TryFrom<u8> for Label {
    type Error = PipelineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Label::Negative),
            1 => Ok(Label::Positive),
            other => Err(PipelineError::data(format!("label must be 0 or 1, got {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledReview {
    pub review: Review,
    pub label:  Label,
}

impl LabeledReview {
    pub fn new(review: Review, label: Label) -> Self {
        Self { review, label }
    }
}

/// One side of the corpus (train or test).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetSplit {
    pub examples: Vec<LabeledReview>,
}

impl DatasetSplit {
    pub fn new(examples: Vec<LabeledReview>) -> Self {
        Self { examples }
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn reviews(&self) -> impl Iterator<Item = &Review> {
        self.examples.iter().map(|e| &e.review)
    }

    pub fn labels(&self) -> Vec<Label> {
        self.examples.iter().map(|e| e.label).collect()
    }

    /// Returns `(negatives, positives)`.
    pub fn label_counts(&self) -> (usize, usize) {
        let positives = self.examples.iter().filter(|e| e.label.is_positive()).count();
        (self.examples.len() - positives, positives)
    }

    pub fn is_balanced(&self) -> bool {
        let (neg, pos) = self.label_counts();
        neg == pos
    }

    /// Largest token index in the split, `None` if every review is empty.
    pub fn max_token(&self) -> Option<u32> {
        self.examples
            .iter()
            .flat_map(|e| e.review.tokens.iter().copied())
            .max()
    }
}

/// Output of the dataset loader: both splits plus the vocabulary bound
/// every token is guaranteed to respect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedCorpus {
    pub train:      DatasetSplit,
    pub test:       DatasetSplit,
    pub vocab_size: usize,
}
