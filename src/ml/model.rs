use burn::{
    nn::{
        loss::BinaryCrossEntropyLossConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::sigmoid,
};

use crate::domain::error::PipelineError;
use crate::ml::gru::{GruEncoder, GruEncoderConfig};

#[derive(Config, Debug)]
pub struct SentimentRnnConfig {
    pub vocab_size:    usize,
    pub seq_len:       usize,
    pub embedding_dim: usize,
    pub hidden_size:   usize,
    #[config(default = 0.2)]
    pub dropout: f64,
    #[config(default = 0.2)]
    pub recurrent_dropout: f64,
}

impl SentimentRnnConfig {
    /// Reject sizes that cannot describe a model.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let sizes = [
            ("vocab_size",    self.vocab_size),
            ("seq_len",       self.seq_len),
            ("embedding_dim", self.embedding_dim),
            ("hidden_size",   self.hidden_size),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, v)| *v == 0) {
            return Err(PipelineError::config(format!("{name} must be > 0")));
        }
        for (name, p) in [("dropout", self.dropout), ("recurrent_dropout", self.recurrent_dropout)] {
            if !(0.0..1.0).contains(&p) {
                return Err(PipelineError::config(format!("{name} must be in [0, 1), got {p}")));
            }
        }
        Ok(())
    }

    /// Check an input matrix against the assembled shapes before training.
    pub fn check_input(
        &self,
        width:      usize,
        vocab_size: usize,
        max_token:  Option<u32>,
    ) -> Result<(), PipelineError> {
        if width != self.seq_len {
            return Err(PipelineError::ShapeMismatch {
                what:     "sequence length",
                expected: self.seq_len,
                actual:   width,
            });
        }
        if vocab_size != self.vocab_size {
            return Err(PipelineError::ShapeMismatch {
                what:     "vocabulary size",
                expected: self.vocab_size,
                actual:   vocab_size,
            });
        }
        match max_token {
            Some(token) if token as usize >= self.vocab_size => {
                Err(PipelineError::TokenOutOfRange { token, vocab_size: self.vocab_size })
            }
            _ => Ok(()),
        }
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> SentimentRnn<B> {
        let embedding = EmbeddingConfig::new(self.vocab_size, self.embedding_dim).init(device);
        let encoder   = GruEncoderConfig::new(self.embedding_dim, self.hidden_size)
            .with_dropout(self.dropout)
            .with_recurrent_dropout(self.recurrent_dropout)
            .init(device);
        let head      = LinearConfig::new(self.hidden_size, 1).init(device);
        SentimentRnn { embedding, encoder, head }
    }
}

#[derive(Module, Debug)]
pub struct SentimentRnn<B: Backend> {
    pub embedding: Embedding<B>,
    pub encoder:   GruEncoder<B>,
    pub head:      Linear<B>,
}

impl<B: Backend> SentimentRnn<B> {
    /// tokens: [batch, seq_len] → logits: [batch]
    pub fn forward_logits(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 1> {
        let [batch_size, _] = tokens.dims();

        let embedded = self.embedding.forward(tokens); // [batch, seq_len, embedding_dim]
        let summary  = self.encoder.forward(embedded);  // [batch, hidden_size]
        self.head.forward(summary).reshape([batch_size])
    }

    /// tokens: [batch, seq_len] → P(positive): [batch]
    pub fn forward(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 1> {
        sigmoid(self.forward_logits(tokens))
    }

    /// Mean binary cross-entropy over the batch, plus the probabilities.
    pub fn forward_loss(
        &self,
        tokens: Tensor<B, 2, Int>,
        labels: Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 1>) {
        let logits = self.forward_logits(tokens);
        let bce = BinaryCrossEntropyLossConfig::new()
            .with_logits(true)
            .init(&logits.device());
        let loss = bce.forward(logits.clone(), labels);
        (loss, sigmoid(logits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn config() -> SentimentRnnConfig {
        SentimentRnnConfig::new(50, 6, 4, 3)
    }

    #[test]
    fn test_reference_defaults() {
        let cfg = SentimentRnnConfig::new(20_000, 100, 100, 32);
        assert_eq!(cfg.dropout, 0.2);
        assert_eq!(cfg.recurrent_dropout, 0.2);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_sizes_are_rejected() {
        let cfg = SentimentRnnConfig::new(50, 6, 0, 3);
        assert!(matches!(cfg.validate(), Err(PipelineError::Config(msg)) if msg.contains("embedding_dim")));
        let cfg = SentimentRnnConfig::new(50, 6, 4, 0);
        assert!(matches!(cfg.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_dropout_must_be_a_probability() {
        let cfg = config().with_recurrent_dropout(1.0);
        assert!(matches!(cfg.validate(), Err(PipelineError::Config(_))));
        let cfg = config().with_dropout(-0.1);
        assert!(matches!(cfg.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_width_mismatch_fails_fast() {
        let err = config().check_input(8, 50, Some(3));
        assert!(matches!(
            err,
            Err(PipelineError::ShapeMismatch { what: "sequence length", expected: 6, actual: 8 })
        ));
    }

    #[test]
    fn test_vocab_mismatch_fails_fast() {
        let err = config().check_input(6, 40, Some(3));
        assert!(matches!(err, Err(PipelineError::ShapeMismatch { what: "vocabulary size", .. })));
    }

    #[test]
    fn test_token_outside_embedding_table_fails_fast() {
        let err = config().check_input(6, 50, Some(50));
        assert!(matches!(err, Err(PipelineError::TokenOutOfRange { token: 50, vocab_size: 50 })));
        assert!(config().check_input(6, 50, Some(49)).is_ok());
    }

    #[test]
    fn test_forward_gives_one_probability_per_review() {
        let device = Default::default();
        let model  = config().init::<TestBackend>(&device);
        let tokens = Tensor::<TestBackend, 1, Int>::from_ints([0, 0, 1, 4, 9, 2, 1, 5, 5, 5, 7, 49], &device)
            .reshape([2, 6]);

        let probs: Vec<f32> = model.forward(tokens).into_data().iter::<f32>().collect();
        assert_eq!(probs.len(), 2);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_loss_is_positive_scalar() {
        let device = Default::default();
        let model  = config().init::<TestBackend>(&device);
        let tokens = Tensor::<TestBackend, 2, Int>::zeros([3, 6], &device);
        let labels = Tensor::<TestBackend, 1, Int>::from_ints([1, 0, 1], &device);

        let (loss, probs) = model.forward_loss(tokens, labels);
        assert_eq!(loss.dims(), [1]);
        assert_eq!(probs.dims(), [3]);
        assert!(loss.into_scalar().elem::<f64>() > 0.0);
    }
}
