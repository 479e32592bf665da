use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::data::sequence::PaddedMatrix;
use crate::domain::error::PipelineError;
use crate::domain::review::Label;

/// One padded review and its 0/1 label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentItem {
    pub tokens: Vec<u32>,
    pub label:  u8,
}

/// Read-only view of a normalized split, shared by training and scoring.
pub struct SentimentDataset {
    items:      Vec<SentimentItem>,
    seq_len:    usize,
    vocab_size: usize,
}

impl SentimentDataset {
    /// Pair every matrix row with its label.
    ///
    /// Fails fast when a token escapes the vocabulary bound or the
    /// number of rows and labels disagree.
    pub fn new(
        matrix:     &PaddedMatrix,
        labels:     &[Label],
        vocab_size: usize,
    ) -> Result<Self, PipelineError> {
        if matrix.rows() != labels.len() {
            return Err(PipelineError::data(format!(
                "{} padded rows but {} labels",
                matrix.rows(),
                labels.len()
            )));
        }
        if let Some(token) = matrix.max_token() {
            if token as usize >= vocab_size {
                return Err(PipelineError::TokenOutOfRange { token, vocab_size });
            }
        }

        let items = matrix
            .iter_rows()
            .zip(labels)
            .map(|(row, label)| SentimentItem { tokens: row.to_vec(), label: label.as_u8() })
            .collect();

        Ok(Self { items, seq_len: matrix.width(), vocab_size })
    }

    pub fn seq_len(&self) -> usize {
        self.seq_len
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }
}

impl Dataset<SentimentItem> for SentimentDataset {
    fn get(&self, index: usize) -> Option<SentimentItem> {
        self.items.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sequence::{pad_sequences, PAD_TOKEN};
    use crate::domain::review::Review;

    fn matrix(rows: &[&[u32]], width: usize) -> PaddedMatrix {
        let reviews: Vec<Review> = rows.iter().map(|r| Review::new(r.to_vec())).collect();
        pad_sequences(&reviews, width, PAD_TOKEN).unwrap()
    }

    #[test]
    fn test_items_follow_matrix_rows() {
        let m  = matrix(&[&[1, 4], &[1, 5, 6]], 3);
        let ds = SentimentDataset::new(&m, &[Label::Positive, Label::Negative], 10).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.seq_len(), 3);
        assert_eq!(ds.get(0).unwrap(), SentimentItem { tokens: vec![0, 1, 4], label: 1 });
        assert_eq!(ds.get(1).unwrap().label, 0);
        assert!(ds.get(2).is_none());
    }

    #[test]
    fn test_token_out_of_range_fails_fast() {
        let m   = matrix(&[&[1, 10]], 3);
        let err = SentimentDataset::new(&m, &[Label::Positive], 10);
        assert!(matches!(err, Err(PipelineError::TokenOutOfRange { token: 10, vocab_size: 10 })));
    }

    #[test]
    fn test_row_label_mismatch_is_data_error() {
        let m   = matrix(&[&[1], &[2]], 2);
        let err = SentimentDataset::new(&m, &[Label::Positive], 10);
        assert!(matches!(err, Err(PipelineError::Data(_))));
    }
}
