// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load + bound the corpus      (Layer 4 - data)
//   Step 2: Pad / truncate both splits   (Layer 4 - data)
//   Step 3: Build Burn datasets          (Layer 4 - data)
//   Step 4: Save config, reset metrics   (Layer 6 - infra)
//   Step 5: Run the epoch loop           (Layer 5 - ml)
//
// The test split doubles as the validation split: it drives
// early stopping and produces the final held-out AUC.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{Context, Result};
use burn::backend::{Autodiff, NdArray, Wgpu};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::data::{
    dataset::SentimentDataset,
    loader::{JsonCorpus, LoadOptions},
    sequence::{pad_sequences, PAD_TOKEN},
};
use crate::domain::error::PipelineError;
use crate::domain::review::{DatasetSplit, LoadedCorpus};
use crate::domain::traits::CorpusSource;
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::model::SentimentRnnConfig;
use crate::ml::trainer::{run_training, TrainingOutcome};
use crate::ml::training_loop::TrainingLimits;

// ─── ComputeBackend ───────────────────────────────────────────────────────────
/// Which Burn backend runs the tensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputeBackend {
    /// GPU through WGPU
    Wgpu,
    /// CPU through ndarray
    NdArray,
}

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Saved next to the checkpoint so `evaluate` can rebuild the
// same loader options and architecture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub corpus_path:       String,
    pub checkpoint_dir:    String,

    // corpus loading
    pub num_words:         Option<usize>,
    pub skip_top:          usize,
    pub maxlen_filter:     Option<usize>,
    pub shuffle_seed:      u64,

    // architecture
    pub seq_len:           usize,
    pub embedding_dim:     usize,
    pub hidden_size:       usize,
    pub dropout:           f64,
    pub recurrent_dropout: f64,

    // optimisation
    pub batch_size:        usize,
    pub max_epochs:        usize,
    pub patience:          usize,
    pub lr:                f64,
    pub seed:              u64,
    pub time_limit_secs:   Option<u64>,

    pub backend:           ComputeBackend,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            corpus_path:       "data/imdb.json".to_string(),
            checkpoint_dir:    "checkpoints".to_string(),
            num_words:         Some(20_000),
            skip_top:          0,
            maxlen_filter:     None,
            shuffle_seed:      113,
            seq_len:           100,
            embedding_dim:     100,
            hidden_size:       32,
            dropout:           0.2,
            recurrent_dropout: 0.2,
            batch_size:        32,
            max_epochs:        100,
            patience:          5,
            lr:                1e-3,
            seed:              42,
            time_limit_secs:   None,
            backend:           ComputeBackend::Wgpu,
        }
    }
}

impl TrainConfig {
    /// Reject settings no component checks on its own.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.batch_size == 0 {
            return Err(PipelineError::config("batch_size must be > 0"));
        }
        Ok(())
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            num_words: self.num_words,
            skip_top:  self.skip_top,
            maxlen:    self.maxlen_filter,
            seed:      self.shuffle_seed,
            ..LoadOptions::default()
        }
    }

    pub fn model_config(&self, vocab_size: usize) -> SentimentRnnConfig {
        SentimentRnnConfig::new(vocab_size, self.seq_len, self.embedding_dim, self.hidden_size)
            .with_dropout(self.dropout)
            .with_recurrent_dropout(self.recurrent_dropout)
    }

    pub fn limits(&self) -> TrainingLimits {
        TrainingLimits {
            max_epochs: self.max_epochs,
            patience:   self.patience,
            time_limit: self.time_limit_secs.map(Duration::from_secs),
            ..TrainingLimits::default()
        }
    }
}

/// Pad / truncate one split to `seq_len` and pair it with its labels.
pub(crate) fn normalized_split(
    cfg:        &TrainConfig,
    split:      &DatasetSplit,
    vocab_size: usize,
) -> Result<SentimentDataset> {
    let matrix = pad_sequences(split.reviews(), cfg.seq_len, PAD_TOKEN)?;
    Ok(SentimentDataset::new(&matrix, &split.labels(), vocab_size)?)
}

pub(crate) fn load_corpus(cfg: &TrainConfig) -> Result<LoadedCorpus> {
    JsonCorpus::new(&cfg.corpus_path)
        .load(&cfg.load_options())
        .with_context(|| format!("Cannot load corpus '{}'", cfg.corpus_path))
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainingOutcome> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Step 1: Load the corpus ───────────────────────────────────────────
        let corpus = load_corpus(cfg)?;
        tracing::info!(
            "Loaded {} train / {} test reviews, vocabulary bound {}",
            corpus.train.len(),
            corpus.test.len(),
            corpus.vocab_size,
        );

        // ── Steps 2-3: Normalize and wrap as datasets ─────────────────────────
        let train_dataset = normalized_split(cfg, &corpus.train, corpus.vocab_size)?;
        let test_dataset  = normalized_split(cfg, &corpus.test, corpus.vocab_size)?;
        tracing::info!("Padded both splits to {} tokens", cfg.seq_len);

        // ── Step 4: Persist config, start a fresh metrics table ───────────────
        let ckpt    = CheckpointManager::new(&cfg.checkpoint_dir)?;
        ckpt.save_config(cfg)?;
        let metrics = MetricsLogger::create(&cfg.checkpoint_dir)?;

        // ── Step 5: Train on the chosen backend ───────────────────────────────
        let outcome = match cfg.backend {
            ComputeBackend::Wgpu => {
                let device = burn::backend::wgpu::WgpuDevice::default();
                tracing::info!("Using WGPU device: {:?}", device);
                run_training::<Autodiff<Wgpu>>(cfg, train_dataset, test_dataset, &ckpt, &metrics, device)?
            }
            ComputeBackend::NdArray => {
                tracing::info!("Using ndarray CPU backend");
                run_training::<Autodiff<NdArray>>(
                    cfg, train_dataset, test_dataset, &ckpt, &metrics, Default::default(),
                )?
            }
        };

        tracing::info!(
            "Training finished ({:?}); metrics in '{}'",
            outcome.report.stop_reason,
            metrics.csv_path().display(),
        );
        Ok(outcome)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::application::evaluate_use_case::EvaluateUseCase;
    use crate::data::loader::RawCorpus;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::path::Path;

    /// Balanced synthetic corpus: positive reviews lean on ranks [5, 15),
    /// negative ones on [15, 25), both sprinkled with noise from [25, 35).
    pub(crate) fn synthetic_corpus(n_train: usize, n_test: usize) -> RawCorpus {
        let mut rng = StdRng::seed_from_u64(7);
        let mut split = |n: usize| {
            let mut xs = Vec::with_capacity(n);
            let mut ys = Vec::with_capacity(n);
            for i in 0..n {
                let label = (i % 2) as u8;
                let (lo, hi) = if label == 1 { (5, 15) } else { (15, 25) };
                let len = rng.gen_range(6..14);
                let review: Vec<u32> = (0..len)
                    .map(|_| if rng.gen_bool(0.7) { rng.gen_range(lo..hi) } else { rng.gen_range(25..35) })
                    .collect();
                xs.push(review);
                ys.push(label);
            }
            (xs, ys)
        };
        let (x_train, y_train) = split(n_train);
        let (x_test, y_test)   = split(n_test);
        RawCorpus { x_train, y_train, x_test, y_test }
    }

    pub(crate) fn write_corpus(dir: &Path, raw: &RawCorpus) -> String {
        let path = dir.join("corpus.json");
        std::fs::write(&path, serde_json::to_string(raw).unwrap()).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn small_config(dir: &Path, corpus_path: String) -> TrainConfig {
        TrainConfig {
            corpus_path,
            checkpoint_dir: dir.join("ckpt").to_string_lossy().into_owned(),
            num_words:      Some(40),
            seq_len:        16,
            embedding_dim:  8,
            hidden_size:    8,
            batch_size:     16,
            max_epochs:     8,
            patience:       3,
            lr:             1e-2,
            backend:        ComputeBackend::NdArray,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_reference_defaults() {
        let cfg = TrainConfig::default();
        assert_eq!(cfg.load_options(), LoadOptions::default());
        let model = cfg.model_config(20_000);
        assert_eq!((model.seq_len, model.embedding_dim, model.hidden_size), (100, 100, 32));
        let limits = cfg.limits();
        assert_eq!((limits.max_epochs, limits.patience), (100, 5));
        assert!(limits.time_limit.is_none());
    }

    #[test]
    fn test_backend_serializes_lowercase() {
        let json = serde_json::to_string(&ComputeBackend::NdArray).unwrap();
        assert_eq!(json, "\"ndarray\"");
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = write_corpus(dir.path(), &synthetic_corpus(8, 8));
        let cfg = TrainConfig { batch_size: 0, ..small_config(dir.path(), corpus) };
        assert!(TrainUseCase::new(cfg).execute().is_err());
    }

    #[test]
    fn test_learns_synthetic_corpus_end_to_end() {
        let dir    = tempfile::tempdir().unwrap();
        let corpus = write_corpus(dir.path(), &synthetic_corpus(256, 128));
        let cfg    = small_config(dir.path(), corpus);

        let outcome = TrainUseCase::new(cfg.clone()).execute().unwrap();

        assert!(outcome.final_metrics.auc > 0.5, "auc = {}", outcome.final_metrics.auc);
        assert!(outcome.report.history.len() <= cfg.max_epochs);

        let csv = std::fs::read_to_string(Path::new(&cfg.checkpoint_dir).join("metrics.csv")).unwrap();
        assert_eq!(csv.lines().count(), 1 + outcome.report.history.len());

        // The saved checkpoint scores the same split from scratch
        let evaluated = EvaluateUseCase::new(&cfg.checkpoint_dir, None, Some(ComputeBackend::NdArray))
            .execute()
            .unwrap();
        assert!(evaluated.auc > 0.5, "auc = {}", evaluated.auc);
        assert!((evaluated.auc - outcome.final_metrics.auc).abs() < 0.05);
    }
}
