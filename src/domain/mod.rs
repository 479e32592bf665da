// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs, enums and traits describing the corpus and
// the failures the pipeline can report.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Reviews, labels and dataset splits
pub mod review;

// Error taxonomy shared by every stage
pub mod error;

// Core abstractions (traits) that other layers implement
pub mod traits;
