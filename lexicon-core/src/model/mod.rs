//! Word-level n-gram modeling and generation.
//!
//! This module provides:
//! - Fixed-order n-gram models (`NGramModel`) and their per-key `State`
//! - Model construction from token sequences (`ModelBuilder`)
//! - Weighted next-token selection with anti-repetition (`Sampler`)
//! - Seeded text generation (`Generator`)
//! - Question answering on top of generation (`AnswerFilter`)

/// Fixed-order n-gram model (`n >= 2`).
///
/// Handles key lookup, random key selection, merging and the JSON and
/// binary wire forms.
pub mod ngram_model;

/// Next-token distribution of a single key, in first-seen order.
pub mod state;

/// Sliding-window counting of a token sequence into a model.
pub mod builder;

/// Weighted random choice and the bounded recent-token history.
pub mod sampler;

/// Token-by-token extension of a seed phrase.
pub mod generator;

/// Question-echo removal and regeneration fallback.
pub mod answer;

#[cfg(test)]
pub(crate) mod test_rng;
