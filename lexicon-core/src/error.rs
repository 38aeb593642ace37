use std::io;

use thiserror::Error;

/// Errors produced by model construction, loading and generation.
///
/// The first three variants are the locally detected failures of the engine
/// itself. The remaining ones belong to the storage and configuration layers.
#[derive(Debug, Error)]
pub enum Error {
	/// Empty corpus, malformed question, question with no usable word,
	/// out-of-range length or invalid model name.
	#[error("invalid input: {0}")]
	InvalidInput(String),

	/// The cleaned corpus holds fewer tokens than the n-gram size.
	#[error("not enough data: {tokens} token(s) for a {n}-gram model")]
	InsufficientData { tokens: usize, n: usize },

	/// Generation was attempted on a model without any n-gram.
	#[error("model is empty, build or load it first")]
	ModelNotReady,

	/// A serialized model violates the model invariants.
	#[error("corrupt model: {0}")]
	CorruptModel(String),

	/// No model with this name in the store.
	#[error("model '{0}' not found")]
	ModelNotFound(String),

	#[error("invalid configuration: {0}")]
	Config(String),

	#[error(transparent)]
	Io(#[from] io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Postcard(#[from] postcard::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
