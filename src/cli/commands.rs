// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `evaluate`, and all
// their configurable flags. Defaults reproduce the reference
// experiment.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};
use crate::application::train_use_case::{ComputeBackend, TrainConfig};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the GRU classifier with early stopping on validation AUC
    Train(TrainArgs),

    /// Score the saved best model on the held-out split
    Evaluate(EvaluateArgs),
}

/// Backend selector as it appears on the command line
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum BackendArg {
    /// GPU via WGPU
    Wgpu,
    /// CPU via ndarray
    Ndarray,
}

impl From<BackendArg> for ComputeBackend {
    fn from(b: BackendArg) -> Self {
        match b {
            BackendArg::Wgpu    => ComputeBackend::Wgpu,
            BackendArg::Ndarray => ComputeBackend::NdArray,
        }
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Pre-tokenized corpus (JSON with x_train/y_train/x_test/y_test)
    #[arg(long, default_value = "data/imdb.json")]
    pub corpus: String,

    /// Directory for the best model, config and metrics.csv
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Vocabulary bound N; rarer words become the OOV token
    #[arg(long, default_value_t = 20_000)]
    pub num_words: usize,

    /// Also treat the most frequent words as OOV
    #[arg(long, default_value_t = 0)]
    pub skip_top: usize,

    /// Drop reviews whose length is not below this
    #[arg(long)]
    pub maxlen_filter: Option<usize>,

    /// Seed of the fixed corpus shuffle
    #[arg(long, default_value_t = 113)]
    pub shuffle_seed: u64,

    /// Tokens per review after padding / truncation
    #[arg(long, default_value_t = 100)]
    pub seq_len: usize,

    #[arg(long, default_value_t = 100)]
    pub embedding_dim: usize,

    /// GRU hidden units
    #[arg(long, default_value_t = 32)]
    pub hidden_size: usize,

    /// Dropout on the GRU inputs
    #[arg(long, default_value_t = 0.2)]
    pub dropout: f64,

    /// Dropout on the GRU recurrent state
    #[arg(long, default_value_t = 0.2)]
    pub recurrent_dropout: f64,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Upper bound on epochs; early stopping usually ends sooner
    #[arg(long, default_value_t = 100)]
    pub max_epochs: usize,

    /// Epochs without a val_auc improvement before stopping
    #[arg(long, default_value_t = 5)]
    pub patience: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Seed for weight init, dropout masks and batch order
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Stop at the first epoch boundary after this many seconds
    #[arg(long)]
    pub time_limit_secs: Option<u64>,

    #[arg(long, value_enum, default_value_t = BackendArg::Wgpu)]
    pub backend: BackendArg,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            corpus_path:       a.corpus,
            checkpoint_dir:    a.checkpoint_dir,
            num_words:         Some(a.num_words),
            skip_top:          a.skip_top,
            maxlen_filter:     a.maxlen_filter,
            shuffle_seed:      a.shuffle_seed,
            seq_len:           a.seq_len,
            embedding_dim:     a.embedding_dim,
            hidden_size:       a.hidden_size,
            dropout:           a.dropout,
            recurrent_dropout: a.recurrent_dropout,
            batch_size:        a.batch_size,
            max_epochs:        a.max_epochs,
            patience:          a.patience,
            lr:                a.lr,
            seed:              a.seed,
            time_limit_secs:   a.time_limit_secs,
            backend:           a.backend.into(),
        }
    }
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Directory written by a previous `train` run
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Corpus to score instead of the one recorded at training time
    #[arg(long)]
    pub corpus: Option<String>,

    /// Backend to score on instead of the one used for training
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_defaults_match_reference_config() {
        let cli = Cli::try_parse_from(["imdb-gru-sentiment", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        let reference = TrainConfig::default();

        assert_eq!(cfg.num_words, reference.num_words);
        assert_eq!(cfg.seq_len, reference.seq_len);
        assert_eq!(cfg.hidden_size, reference.hidden_size);
        assert_eq!(cfg.patience, reference.patience);
        assert_eq!(cfg.max_epochs, reference.max_epochs);
        assert_eq!(cfg.backend, ComputeBackend::Wgpu);
    }

    #[test]
    fn test_evaluate_backend_override() {
        let cli = Cli::try_parse_from([
            "imdb-gru-sentiment", "evaluate", "--backend", "ndarray", "--checkpoint-dir", "runs/a",
        ])
        .unwrap();
        let Commands::Evaluate(args) = cli.command else { panic!("expected evaluate") };
        assert_eq!(args.checkpoint_dir, "runs/a");
        assert_eq!(args.backend.map(ComputeBackend::from), Some(ComputeBackend::NdArray));
    }
}
