// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Re-scores the held-out split with the saved best model:
//
//   Step 1: Load train_config.json from the checkpoint dir
//   Step 2: Reload the corpus with the saved loader options
//   Step 3: Pad the test split to the saved sequence length
//   Step 4: Rebuild the model, load best_model, score
//
// No autodiff backend is needed: nothing is trained here.

use anyhow::Result;
use burn::backend::{NdArray, Wgpu};

use crate::application::train_use_case::{load_corpus, normalized_split, ComputeBackend};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::evaluation::SplitMetrics;
use crate::ml::scorer::evaluate_checkpoint;

pub struct EvaluateUseCase {
    checkpoint_dir: String,
    /// Overrides the corpus path saved with the run
    corpus_path:    Option<String>,
    /// Overrides the backend saved with the run
    backend:        Option<ComputeBackend>,
}

impl EvaluateUseCase {
    pub fn new(
        checkpoint_dir: impl Into<String>,
        corpus_path:    Option<String>,
        backend:        Option<ComputeBackend>,
    ) -> Self {
        Self { checkpoint_dir: checkpoint_dir.into(), corpus_path, backend }
    }

    pub fn execute(&self) -> Result<SplitMetrics> {
        // ── Step 1: Saved configuration ───────────────────────────────────────
        let ckpt    = CheckpointManager::open(&self.checkpoint_dir)?;
        let mut cfg = ckpt.load_config()?;
        if let Some(path) = &self.corpus_path {
            cfg.corpus_path = path.clone();
        }
        cfg.validate()?;

        // ── Steps 2-3: Corpus and normalized test split ───────────────────────
        let corpus  = load_corpus(&cfg)?;
        let test    = normalized_split(&cfg, &corpus.test, corpus.vocab_size)?;
        let model   = cfg.model_config(corpus.vocab_size);
        tracing::info!("Scoring {} held-out reviews", corpus.test.len());

        // ── Step 4: Rebuild, load, score ──────────────────────────────────────
        let metrics = match self.backend.unwrap_or(cfg.backend) {
            ComputeBackend::Wgpu => evaluate_checkpoint::<Wgpu>(
                &ckpt, &model, test, cfg.batch_size, burn::backend::wgpu::WgpuDevice::default(),
            )?,
            ComputeBackend::NdArray => evaluate_checkpoint::<NdArray>(
                &ckpt, &model, test, cfg.batch_size, Default::default(),
            )?,
        };

        tracing::info!(
            "Held-out loss={:.4} accuracy={:.4} auc={:.4}",
            metrics.loss,
            metrics.accuracy,
            metrics.auc,
        );
        Ok(metrics)
    }
}
