// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// File-system concerns shared by training and evaluation:
//
//   checkpoint.rs — best model weights (Burn CompactRecorder),
//                   best epoch and TrainConfig as JSON so
//                   `evaluate` can rebuild the model
//
//   metrics.rs    — per-epoch history table written to a CSV
//                   file for later analysis and plotting
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
