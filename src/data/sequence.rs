// ============================================================
// Layer 4 — Sequence Normalizer
// ============================================================
// Turns variable-length reviews into a fixed-width matrix.
//
// Policy (both operations act on the FRONT of the review):
//   - longer than maxlen  → keep the last maxlen tokens
//   - shorter than maxlen → left-pad with `pad_value`
//
// Example with maxlen = 4, pad = 0:
//   [5, 6]             → [0, 0, 5, 6]
//   [1, 2, 3, 4, 5, 6] → [3, 4, 5, 6]
//
// Reference: Rust Book §8 (Vectors and Slices)

use crate::domain::error::PipelineError;
use crate::domain::review::Review;

/// Padding sentinel used by the pipeline.
pub const PAD_TOKEN: u32 = 0;

/// Row-major matrix of token ids, every row exactly `width` wide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedMatrix {
    width: usize,
    data:  Vec<u32>,
}

impl PaddedMatrix {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn rows(&self) -> usize {
        self.data.len() / self.width
    }

    #[cfg(test)]
    pub fn row(&self, index: usize) -> &[u32] {
        &self.data[index * self.width..(index + 1) * self.width]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[u32]> {
        self.data.chunks_exact(self.width)
    }

    pub fn max_token(&self) -> Option<u32> {
        self.data.iter().copied().max()
    }
}

/// Pre-pad / pre-truncate every review to `maxlen` tokens.
pub fn pad_sequences<'a, I>(
    reviews:   I,
    maxlen:    usize,
    pad_value: u32,
) -> Result<PaddedMatrix, PipelineError>
where
    I: IntoIterator<Item = &'a Review>,
{
    if maxlen == 0 {
        return Err(PipelineError::config("sequence length must be > 0"));
    }

    let mut data = Vec::new();
    for review in reviews {
        let tokens = &review.tokens;
        if tokens.len() >= maxlen {
            data.extend_from_slice(&tokens[tokens.len() - maxlen..]);
        } else {
            data.extend(std::iter::repeat(pad_value).take(maxlen - tokens.len()));
            data.extend_from_slice(tokens);
        }
    }

    Ok(PaddedMatrix { width: maxlen, data })
}
