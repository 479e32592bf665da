// ============================================================
// Layer 3 — Pipeline Error Taxonomy
// ============================================================
// Every stage returns these errors so the CLI can report what
// kind of failure aborted the run:
//
//   Config          — inconsistent hyperparameters (fatal before training)
//   ShapeMismatch   — matrix width vs. model sequence length, etc.
//   TokenOutOfRange — a token index escaped the vocabulary bound
//   Data            — malformed corpus contents
//
// A run that never improves is NOT an error.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Hyperparameters that cannot describe a valid pipeline.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upstream shape disagrees with what the model was assembled for.
    #[error("Shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what:     &'static str,
        expected: usize,
        actual:   usize,
    },

    /// A token index is outside `[0, vocab_size)`.
    #[error("Token index {token} is outside the vocabulary bound {vocab_size}")]
    TokenOutOfRange { token: u32, vocab_size: usize },

    /// Corpus contents violate the expected format.
    #[error("Data error: {0}")]
    Data(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corpus parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_kind() {
        let e = PipelineError::config("hidden_size must be > 0");
        assert_eq!(e.to_string(), "Configuration error: hidden_size must be > 0");

        let e = PipelineError::ShapeMismatch { what: "sequence length", expected: 100, actual: 80 };
        assert!(e.to_string().contains("expected 100, got 80"));

        let e = PipelineError::TokenOutOfRange { token: 20_000, vocab_size: 20_000 };
        assert!(e.to_string().contains("20000"));
    }
}
