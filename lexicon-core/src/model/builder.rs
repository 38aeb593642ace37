use log::info;

use super::ngram_model::NGramModel;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::text::tokenizer::Tokenizer;

/// Characters that close a sentence when they end a token.
const SENTENCE_END: &[char] = &['.', '!', '?'];

/// Builds [`NGramModel`]s from token sequences.
///
/// Building is a pure function of the tokens and the builder settings.
#[derive(Clone, Copy, Debug)]
pub struct ModelBuilder {
	n: usize,
	sentence_boundaries: bool,
}

impl ModelBuilder {
	/// Creates a builder for `n`-gram models, with sentence boundaries on.
	///
	/// # Errors
	/// Returns [`Error::InvalidInput`] if `n < 2`.
	pub fn new(n: usize) -> Result<Self> {
		if n < 2 {
			return Err(Error::InvalidInput(format!("n-gram size must be >= 2, got {n}")));
		}
		Ok(Self { n, sentence_boundaries: true })
	}

	pub fn from_config(config: &Config) -> Result<Self> {
		Ok(Self::new(config.ngram_size)?.with_sentence_boundaries(config.sentence_boundaries))
	}

	/// When on, a window whose key ends with a sentence-final token is not
	/// recorded, so generation stops at the end of a sentence instead of
	/// running into the next one.
	pub fn with_sentence_boundaries(mut self, enabled: bool) -> Self {
		self.sentence_boundaries = enabled;
		self
	}

	pub fn n(&self) -> usize {
		self.n
	}

	/// Slides a window of `n` tokens over `tokens` and counts every
	/// `key -> next` transition.
	///
	/// # Errors
	/// Returns [`Error::InsufficientData`] if there are fewer than `n` tokens.
	pub fn build<S: AsRef<str>>(&self, tokens: &[S]) -> Result<NGramModel> {
		if tokens.len() < self.n {
			return Err(Error::InsufficientData { tokens: tokens.len(), n: self.n });
		}

		let mut model = NGramModel::new(self.n)?;
		for window in tokens.windows(self.n) {
			let (key, next) = window.split_at(self.n - 1);
			if self.sentence_boundaries && ends_sentence(key[key.len() - 1].as_ref()) {
				continue;
			}
			let key = key.iter().map(|t| t.as_ref()).collect::<Vec<&str>>().join(" ");
			model.add_window(key, next[0].as_ref());
		}

		info!("built {model} from {} token(s)", tokens.len());
		Ok(model)
	}

	/// Cleans `text` with `tokenizer` then builds the model.
	///
	/// # Errors
	/// - [`Error::InvalidInput`] if `text` is empty or only whitespace
	/// - [`Error::InsufficientData`] if too few tokens survive cleaning
	pub fn build_from_text(&self, text: &str, tokenizer: &Tokenizer) -> Result<NGramModel> {
		if text.trim().is_empty() {
			return Err(Error::InvalidInput("the corpus is empty".to_owned()));
		}
		self.build(&tokenizer.clean(text))
	}
}

fn ends_sentence(token: &str) -> bool {
	token.ends_with(SENTENCE_END)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::text::stopwords::StopwordSet;

	fn tokens(text: &str) -> Vec<String> {
		text.split_whitespace().map(str::to_owned).collect()
	}

	#[test]
	fn counts_every_window() {
		let model = ModelBuilder::new(2)
			.unwrap()
			.build(&tokens("the cat sat. the cat ran."))
			.unwrap();

		let cat: Vec<_> = model.state("cat").unwrap().iter().collect();
		assert_eq!(cat, vec![("sat.", 1), ("ran.", 1)]);
		let the: Vec<_> = model.state("the").unwrap().iter().collect();
		assert_eq!(the, vec![("cat", 2)]);
		assert!(model.state("sat.").is_none());
		assert!(model.state("ran.").is_none());
	}

	#[test]
	fn windows_cross_sentences_when_boundaries_are_off() {
		let model = ModelBuilder::new(2)
			.unwrap()
			.with_sentence_boundaries(false)
			.build(&tokens("the cat sat. the cat ran."))
			.unwrap();

		let sat: Vec<_> = model.state("sat.").unwrap().iter().collect();
		assert_eq!(sat, vec![("the", 1)]);
	}

	#[test]
	fn trigram_keys_hold_two_tokens() {
		let model = ModelBuilder::new(3).unwrap().build(&tokens("one two three one two four")).unwrap();

		assert_eq!(model.key_len(), 2);
		let transitions: Vec<_> = model.state("one two").unwrap().iter().collect();
		assert_eq!(transitions, vec![("three", 1), ("four", 1)]);
		assert_eq!(model.state("two three").unwrap().count("one"), 1);
		assert_eq!(model.len(), 3);
	}

	#[test]
	fn rejects_too_few_tokens() {
		let builder = ModelBuilder::new(3).unwrap();
		assert!(matches!(
			builder.build(&tokens("only two")),
			Err(Error::InsufficientData { tokens: 2, n: 3 })
		));
	}

	#[test]
	fn rejects_empty_text_before_tokenizing() {
		let builder = ModelBuilder::new(2).unwrap();
		let tokenizer = Tokenizer::new(StopwordSet::empty());
		assert!(matches!(builder.build_from_text("", &tokenizer), Err(Error::InvalidInput(_))));
		assert!(matches!(builder.build_from_text(" \n ", &tokenizer), Err(Error::InvalidInput(_))));
		assert!(matches!(
			builder.build_from_text("a b c", &tokenizer),
			Err(Error::InsufficientData { tokens: 0, .. })
		));
	}

	#[test]
	fn building_is_deterministic() {
		let builder = ModelBuilder::new(2).unwrap();
		let corpus = tokens("le chat mange le poisson puis le chat dort");
		assert_eq!(builder.build(&corpus).unwrap(), builder.build(&corpus).unwrap());
	}
}
