//! Word-level n-gram text generation and question answering.
//!
//! This crate provides:
//! - Text cleaning into lowercase tokens with a configurable stopword set
//! - Word n-gram frequency models with a lossless JSON wire form
//! - Weighted generation with anti-repetition and seedable randomness
//! - Question answering that avoids echoing the question
//! - A directory-backed store of named models
//!
//! The free functions below are the entry points used by the command line
//! and HTTP front ends. They use the default [`Config`] and a thread-local
//! RNG; build a [`Generator`] directly to control either.

/// N-gram models, sampling and generation.
pub mod model;

/// Tokenization, stopwords and capitalization.
pub mod text;

/// Validated settings.
pub mod config;

/// Error type and result alias.
pub mod error;

/// Corpus files, model cache and named model storage.
pub mod io;

pub use config::Config;
pub use error::{Error, Result};
pub use model::answer::AnswerFilter;
pub use model::builder::ModelBuilder;
pub use model::generator::Generator;
pub use model::ngram_model::NGramModel;
pub use text::stopwords::StopwordSet;
pub use text::tokenizer::Tokenizer;

/// Cleans `corpus_text` and builds an `n`-gram model from it.
///
/// `stopwords` replaces the default stopword set when given.
///
/// # Errors
/// - [`Error::InvalidInput`] for an empty corpus or `n < 2`
/// - [`Error::InsufficientData`] when fewer than `n` tokens survive cleaning
pub fn build_model(corpus_text: &str, n: usize, stopwords: Option<&StopwordSet>) -> Result<NGramModel> {
	let tokenizer = Tokenizer::new(stopwords.cloned().unwrap_or_default());
	ModelBuilder::new(n)?.build_from_text(corpus_text, &tokenizer)
}

/// Serializes a model to its JSON wire form.
pub fn serialize_model(model: &NGramModel) -> Result<String> {
	model.to_json()
}

/// Loads a model from its JSON wire form.
///
/// # Errors
/// [`Error::CorruptModel`] if the input breaks any model invariant.
pub fn load_model(wire: &str) -> Result<NGramModel> {
	NGramModel::from_json(wire)
}

/// Generates capitalized text of at most `length` tokens from `seed`.
pub fn generate_text(model: &NGramModel, seed: &str, length: usize) -> Result<String> {
	let tokenizer = Tokenizer::default();
	Generator::new(model, &tokenizer, rand::rng()).generate_text(seed, length)
}

/// Answers `question` with at most `limit` tokens.
pub fn generate_answer(model: &NGramModel, question: &str, limit: usize) -> Result<String> {
	let tokenizer = Tokenizer::default();
	AnswerFilter::new(Generator::new(model, &tokenizer, rand::rng())).answer(question, limit)
}
