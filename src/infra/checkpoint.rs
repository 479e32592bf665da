// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores the best model using Burn's CompactRecorder.
//
// What gets saved:
//   1. best_model.mpk.gz  — parameters of the restored best epoch
//   2. best_epoch.json    — which epoch those parameters come from
//   3. train_config.json  — architecture + loader options, so the
//                           `evaluate` command can rebuild the model
//
// File layout:
//   checkpoints/
//     best_model.mpk.gz
//     best_epoch.json
//     train_config.json
//     metrics.csv          ← written by MetricsLogger
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use serde_json;

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::SentimentRnn;

const MODEL_FILE:  &str = "best_model";
const EPOCH_FILE:  &str = "best_epoch.json";
const CONFIG_FILE: &str = "train_config.json";

/// Manages the files of one training run directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create the manager, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint dir '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Open the directory of a finished run without creating it.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            anyhow::bail!(
                "Checkpoint dir '{}' does not exist. \
                 Make sure you have run 'train' before 'evaluate'.",
                dir.display()
            );
        }
        Ok(Self { dir })
    }

    /// Save the best model's weights and remember its epoch.
    pub fn save_model<B: Backend>(
        &self,
        model: &SentimentRnn<B>,
        epoch: usize,
    ) -> Result<()> {
        // The recorder adds the .mpk.gz extension
        let path = self.dir.join(MODEL_FILE);

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", path.display())
            })?;

        let epoch_path = self.dir.join(EPOCH_FILE);
        fs::write(&epoch_path, serde_json::to_string(&epoch)?)
            .with_context(|| format!("Failed to write '{}'", epoch_path.display()))?;

        tracing::debug!("Saved best model from epoch {}", epoch);
        Ok(())
    }

    /// Load the saved weights into a model of the same architecture.
    pub fn load_model<B: Backend>(
        &self,
        model:  SentimentRnn<B>,
        device: &B::Device,
    ) -> Result<SentimentRnn<B>> {
        let epoch = self.best_epoch()?;
        let path  = self.dir.join(MODEL_FILE);

        tracing::info!("Loading best model (epoch {})", epoch);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display())
            })?;

        Ok(model.load_record(record))
    }

    /// Save the training configuration to JSON.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' before 'evaluate'.",
                    path.display()
                )
            })?;

        Ok(serde_json::from_str(&json)?)
    }

    pub fn best_epoch(&self) -> Result<usize> {
        let path = self.dir.join(EPOCH_FILE);

        let s = fs::read_to_string(&path)
            .with_context(|| {
                format!("Cannot find '{}'. Have you run 'train' first?", path.display())
            })?;

        Ok(serde_json::from_str::<usize>(&s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::SentimentRnnConfig;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_config_round_trip() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        let cfg  = TrainConfig { hidden_size: 7, ..TrainConfig::default() };

        ckpt.save_config(&cfg).unwrap();
        let loaded = ckpt.load_config().unwrap();
        assert_eq!(loaded.hidden_size, 7);
        assert_eq!(loaded.seq_len, cfg.seq_len);
    }

    #[test]
    fn test_saved_weights_reproduce_predictions() {
        let dir    = tempfile::tempdir().unwrap();
        let ckpt   = CheckpointManager::new(dir.path()).unwrap();
        let device = Default::default();
        let cfg    = SentimentRnnConfig::new(12, 5, 4, 3);

        let trained = cfg.init::<TestBackend>(&device);
        ckpt.save_model(&trained, 3).unwrap();

        let fresh    = cfg.init::<TestBackend>(&device);
        let restored = ckpt.load_model(fresh, &device).unwrap();
        assert_eq!(ckpt.best_epoch().unwrap(), 3);

        let tokens = Tensor::<TestBackend, 2, Int>::ones([2, 5], &device);
        let a: Vec<f32> = trained.forward(tokens.clone()).into_data().iter::<f32>().collect();
        let b: Vec<f32> = restored.forward(tokens).into_data().iter::<f32>().collect();
        for (x, y) in a.iter().zip(&b) {
            // CompactRecorder stores half precision
            assert!((x - y).abs() < 1e-2, "{x} vs {y}");
        }
    }

    #[test]
    fn test_open_does_not_create_the_directory() {
        let dir     = tempfile::tempdir().unwrap();
        let missing = dir.path().join("typo");
        assert!(CheckpointManager::open(&missing).is_err());
        assert!(!missing.exists());

        let ckpt = CheckpointManager::open(dir.path()).unwrap();
        assert!(ckpt.best_epoch().is_err());
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        assert!(ckpt.load_config().is_err());
        assert!(ckpt.best_epoch().is_err());
    }
}
