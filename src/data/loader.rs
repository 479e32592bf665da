// ============================================================
// Layer 4 — Corpus Loader
// ============================================================
// Loads the fixed, pre-tokenized movie-review corpus and maps it
// onto a bounded vocabulary.
//
// Raw corpus format (JSON):
//   {
//     "x_train": [[14, 22, 16, ...], ...],   ← frequency ranks, 1 = most common
//     "y_train": [1, 0, ...],
//     "x_test":  [[...], ...],
//     "y_test":  [...]
//   }
//
// Processing order (every step is deterministic):
//   1. Shuffle train, then test, with one RNG seeded from `seed`
//   2. Shift every rank by `index_from` and prepend `start_char`
//   3. Drop reviews whose length is not strictly below `maxlen`
//   4. Replace ids outside [skip_top, num_words) with `oov_char`
//      (or remove them when no OOV sentinel is configured)
//
// Ids below `index_from` are reserved:
//   0 = padding, 1 = start marker, 2 = out-of-vocabulary
//
// Reference: rand crate documentation (SeedableRng, SliceRandom)
//            serde_json documentation

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::domain::error::PipelineError;
use crate::domain::review::{DatasetSplit, Label, LabeledReview, LoadedCorpus, Review};
use crate::domain::traits::CorpusSource;

// ─── LoadOptions ──────────────────────────────────────────────────────────────
/// Parameters of a single corpus load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Vocabulary bound N. `None` = largest id seen + 1.
    pub num_words:  Option<usize>,
    /// Ids below this are treated as out-of-vocabulary.
    pub skip_top:   usize,
    /// Keep only reviews with length < maxlen (start marker included).
    pub maxlen:     Option<usize>,
    /// Seed of the fixed shuffle.
    pub seed:       u64,
    pub start_char: Option<u32>,
    /// `None` removes out-of-vocabulary ids instead of replacing them.
    pub oov_char:   Option<u32>,
    pub index_from: u32,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            num_words:  Some(20_000),
            skip_top:   0,
            maxlen:     None,
            seed:       113,
            start_char: Some(1),
            oov_char:   Some(2),
            index_from: 3,
        }
    }
}

// ─── RawCorpus ────────────────────────────────────────────────────────────────
/// The corpus exactly as stored: rank-encoded reviews and 0/1 labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCorpus {
    pub x_train: Vec<Vec<u32>>,
    pub y_train: Vec<u8>,
    pub x_test:  Vec<Vec<u32>>,
    pub y_test:  Vec<u8>,
}

impl RawCorpus {
    /// Apply the load options and produce vocabulary-bounded splits.
    pub fn prepare(&self, options: &LoadOptions) -> Result<LoadedCorpus, PipelineError> {
        let train = zip_split("train", &self.x_train, &self.y_train)?;
        let test  = zip_split("test",  &self.x_test,  &self.y_test)?;

        // ── Step 1: fixed shuffle ────────────────────────────────────────────
        let mut rng = StdRng::seed_from_u64(options.seed);
        let train   = shuffled(train, &mut rng);
        let test    = shuffled(test,  &mut rng);

        // ── Step 2: reserve low ids ──────────────────────────────────────────
        let train = shift_indices(train, options);
        let test  = shift_indices(test,  options);

        // ── Step 3: optional length filter ───────────────────────────────────
        let (train, test) = match options.maxlen {
            Some(maxlen) => {
                let train = remove_long(train, maxlen);
                let test  = remove_long(test,  maxlen);
                if train.is_empty() || test.is_empty() {
                    return Err(PipelineError::config(format!(
                        "maxlen={maxlen} filters out every review of a split \
                         ({} train, {} test left)",
                        train.len(),
                        test.len()
                    )));
                }
                (train, test)
            }
            None => (train, test),
        };

        // ── Step 4: bound the vocabulary ─────────────────────────────────────
        let vocab_size = match options.num_words {
            Some(n) => n,
            None => train
                .iter()
                .chain(test.iter())
                .flat_map(|(tokens, _)| tokens.iter().copied())
                .max()
                .map_or(1, |m| m as usize + 1),
        };
        validate_bound(vocab_size, options)?;

        let train = bound_vocabulary(train, vocab_size, options);
        let test  = bound_vocabulary(test,  vocab_size, options);

        Ok(LoadedCorpus { train, test, vocab_size })
    }
}

fn zip_split(
    name:   &str,
    xs:     &[Vec<u32>],
    ys:     &[u8],
) -> Result<Vec<(Vec<u32>, Label)>, PipelineError> {
    if xs.len() != ys.len() {
        return Err(PipelineError::data(format!(
            "{name} split has {} reviews but {} labels",
            xs.len(),
            ys.len()
        )));
    }
    xs.iter()
        .zip(ys)
        .map(|(x, &y)| Label::try_from(y).map(|label| (x.clone(), label)))
        .collect()
}

fn shuffled<T>(mut items: Vec<T>, rng: &mut StdRng) -> Vec<T> {
    items.shuffle(rng);
    items
}

fn shift_indices(
    items:   Vec<(Vec<u32>, Label)>,
    options: &LoadOptions,
) -> Vec<(Vec<u32>, Label)> {
    items
        .into_iter()
        .map(|(tokens, label)| {
            let shifted = tokens.into_iter().map(|w| w.saturating_add(options.index_from));
            let tokens = match options.start_char {
                Some(start) => std::iter::once(start).chain(shifted).collect(),
                None        => shifted.collect(),
            };
            (tokens, label)
        })
        .collect()
}

fn remove_long(items: Vec<(Vec<u32>, Label)>, maxlen: usize) -> Vec<(Vec<u32>, Label)> {
    items.into_iter().filter(|(tokens, _)| tokens.len() < maxlen).collect()
}

fn validate_bound(vocab_size: usize, options: &LoadOptions) -> Result<(), PipelineError> {
    if vocab_size == 0 {
        return Err(PipelineError::config("num_words must be > 0"));
    }
    if let Some(oov) = options.oov_char {
        if oov as usize >= vocab_size {
            return Err(PipelineError::config(format!(
                "oov_char {oov} does not fit in a vocabulary of {vocab_size}"
            )));
        }
    }
    Ok(())
}

fn bound_vocabulary(
    items:      Vec<(Vec<u32>, Label)>,
    vocab_size: usize,
    options:    &LoadOptions,
) -> DatasetSplit {
    let in_range = |w: u32| (options.skip_top..vocab_size).contains(&(w as usize));

    let examples = items
        .into_iter()
        .map(|(tokens, label)| {
            let tokens: Vec<u32> = match options.oov_char {
                Some(oov) => tokens.into_iter().map(|w| if in_range(w) { w } else { oov }).collect(),
                None      => tokens.into_iter().filter(|&w| in_range(w)).collect(),
            };
            LabeledReview::new(Review::new(tokens), label)
        })
        .collect();

    DatasetSplit::new(examples)
}

fn log_split(name: &str, split: &DatasetSplit) {
    let (neg, pos) = split.label_counts();
    tracing::info!("{} split: {} reviews ({} negative, {} positive)", name, split.len(), neg, pos);
    if !split.is_balanced() {
        tracing::warn!("{} split is not balanced 50/50", name);
    }
}

// ─── JsonCorpus ───────────────────────────────────────────────────────────────
/// Reads the raw corpus from a JSON file on every load.
pub struct JsonCorpus {
    path: PathBuf,
}

impl JsonCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_raw(&self) -> Result<RawCorpus, PipelineError> {
        let json = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl CorpusSource for JsonCorpus {
    fn load(&self, options: &LoadOptions) -> Result<LoadedCorpus, PipelineError> {
        tracing::info!("Reading corpus from '{}'", self.path.display());
        let corpus = self.read_raw()?.prepare(options)?;
        log_split("train", &corpus.train);
        log_split("test",  &corpus.test);
        Ok(corpus)
    }
}
