use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::text::stopwords::StopwordSet;
use crate::text::tokenizer::Tokenizer;

/// Largest accepted `history`.
pub const MAX_HISTORY: usize = 1000;

/// Settings shared by model building, generation and answering.
///
/// Every field has a default, so a partial JSON file only overrides what
/// it names:
///
/// ```json
/// { "ngram_size": 3, "stopwords": ["the", "and"] }
/// ```
///
/// # Invariants (checked by [`Config::validate`])
/// - `ngram_size >= 2`
/// - `history <= MAX_HISTORY`
/// - `answer_min_length >= 1` and `fallback_min_length >= 1`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Number of tokens in a window (key + next).
	pub ngram_size: usize,

	/// Number of recently emitted tokens the sampler avoids, 0 disables it.
	pub history: usize,

	/// Stop windows at tokens ending with `.`, `!` or `?`.
	pub sentence_boundaries: bool,

	/// Replaces the default stopword list when set.
	pub stopwords: Option<Vec<String>>,

	/// Shortest answer length drawn, also the smallest accepted limit.
	pub answer_min_length: usize,

	/// Shortest length drawn when an answer is regenerated without filter.
	pub fallback_min_length: usize,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			ngram_size: 2,
			history: 5,
			sentence_boundaries: true,
			stopwords: None,
			answer_min_length: 10,
			fallback_min_length: 5,
		}
	}
}

impl Config {
	/// Parses and validates a JSON configuration.
	pub fn from_json(json: &str) -> Result<Self> {
		let config: Self = serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
		config.validate()?;
		Ok(config)
	}

	/// Reads a JSON configuration file.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
		Self::from_json(&fs::read_to_string(path)?)
	}

	/// Checks value ranges.
	///
	/// # Errors
	/// Returns [`Error::Config`] naming the first rule that failed.
	pub fn validate(&self) -> Result<()> {
		if self.ngram_size < 2 {
			return Err(Error::Config(format!("ngram_size must be >= 2, got {}", self.ngram_size)));
		}
		if self.history > MAX_HISTORY {
			return Err(Error::Config(format!(
				"history must be <= {MAX_HISTORY}, got {}",
				self.history
			)));
		}
		if self.answer_min_length == 0 {
			return Err(Error::Config("answer_min_length must be >= 1".to_owned()));
		}
		if self.fallback_min_length == 0 {
			return Err(Error::Config("fallback_min_length must be >= 1".to_owned()));
		}
		Ok(())
	}

	/// The configured stopwords, or the default list.
	pub fn stopword_set(&self) -> StopwordSet {
		match &self.stopwords {
			Some(words) => StopwordSet::new(words),
			None => StopwordSet::default(),
		}
	}

	pub fn tokenizer(&self) -> Tokenizer {
		Tokenizer::new(self.stopword_set())
	}
}
