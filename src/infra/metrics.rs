// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records the per-epoch history table to a CSV file.
//
// Columns:
//   epoch, loss, accuracy, auc, val_loss, val_accuracy, val_auc
//
// One row is appended per completed epoch, whether or not that
// epoch set a new best validation AUC.
//
// Output file: checkpoints/metrics.csv
//
// Example CSV output:
//   epoch,loss,accuracy,auc,val_loss,val_accuracy,val_auc
//   1,0.612000,0.661000,0.720000,0.498000,0.771000,0.853000
//   2,0.431000,0.806000,0.884000,0.402000,0.824000,0.905000
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

use crate::ml::evaluation::SplitMetrics;

pub const CSV_HEADER: &str = "epoch,loss,accuracy,auc,val_loss,val_accuracy,val_auc";

/// One row of the history table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Mean binary cross-entropy over the training batches
    pub loss: f64,

    pub accuracy: f64,

    /// ROC AUC of the predictions made while training (dropout active)
    pub auc: f64,

    pub val_loss: f64,

    pub val_accuracy: f64,

    /// ROC AUC on the whole held-out split — the early-stopping monitor
    pub val_auc: f64,
}

impl EpochMetrics {
    pub fn from_splits(epoch: usize, train: &SplitMetrics, val: &SplitMetrics) -> Self {
        Self {
            epoch,
            loss:         train.loss,
            accuracy:     train.accuracy,
            auc:          train.auc,
            val_loss:     val.loss,
            val_accuracy: val.accuracy,
            val_auc:      val.auc,
        }
    }

    fn csv_row(&self) -> String {
        format!(
            "{},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6}",
            self.epoch,
            self.loss,
            self.accuracy,
            self.auc,
            self.val_loss,
            self.val_accuracy,
            self.val_auc,
        )
    }
}

/// Writes epoch metrics to `metrics.csv` in the given directory.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Start a fresh table: the file is truncated and the header written.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        let mut f = fs::File::create(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
        writeln!(f, "{CSV_HEADER}")?;
        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(f, "{}", m.csv_row())?;

        tracing::debug!(
            "Logged epoch {} metrics: loss={:.4}, val_loss={:.4}, val_auc={:.4}",
            m.epoch,
            m.loss,
            m.val_loss,
            m.val_auc,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
