// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer loads the corpus through this trait
// and never sees the storage format.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use crate::data::loader::LoadOptions;
use crate::domain::error::PipelineError;
use crate::domain::review::LoadedCorpus;

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// Any provider of the fixed, pre-tokenized labelled corpus.
///
/// Implementations:
///   - JsonCorpus → reads x_train / y_train / x_test / y_test from a file
pub trait CorpusSource {
    /// Load train and test splits with every token in `[0, vocab_size)`.
    /// Identical options must produce identical output.
    fn load(&self, options: &LoadOptions) -> Result<LoadedCorpus, PipelineError>;
}
