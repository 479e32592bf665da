// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the pre-tokenized corpus to tensor batches:
//
//   corpus JSON
//       │
//       ▼
//   JsonCorpus        → shuffle, shift ids, bound the vocabulary
//       │
//       ▼
//   pad_sequences     → fixed-width matrix (pre-pad, pre-truncate)
//       │
//       ▼
//   SentimentDataset  → implements Burn's Dataset trait
//       │
//       ▼
//   SentimentBatcher  → stacks items into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Loads the corpus and applies vocabulary bound / OOV mapping
pub mod loader;

/// Pads and truncates reviews to a fixed length
pub mod sequence;

/// Implements Burn's Dataset trait for padded reviews
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
