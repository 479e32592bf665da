// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Everything that builds, trains or scores the network.
//
//   gru.rs            — GRU encoder with input + recurrent dropout
//   model.rs          — embedding → GRU → sigmoid head, shape checks
//   evaluation.rs     — loss / accuracy / ROC AUC over a split
//   early_stopping.rs — patience on validation AUC, best snapshot
//   training_loop.rs  — Training → Validating → EarlyStopCheck → Done
//   trainer.rs        — Burn runner (Adam, data loaders) for that loop
//   scorer.rs         — inference-mode scoring and checkpoint evaluation
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Cho et al. (2014) GRU

/// Gated recurrent encoder
pub mod gru;

/// Sentiment classifier architecture
pub mod model;

/// Split-level metrics
pub mod evaluation;

pub mod early_stopping;

/// Epoch state machine
pub mod training_loop;

/// Burn training loop with validation and checkpointing
pub mod trainer;

pub mod scorer;
