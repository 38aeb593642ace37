use std::collections::HashSet;

use log::debug;
use rand::Rng;

use super::generator::Generator;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::text::capitalize::capitalize;

const CLOSING_MARKS: &[char] = &['?', '!', '.'];

/// Answers questions with a [`Generator`].
///
/// The answer is generated from the question itself, then every word of the
/// question is removed from it so the answer does not echo the prompt. If
/// nothing is left, one unfiltered answer is generated from a random key.
#[derive(Debug)]
pub struct AnswerFilter<'a, R> {
	generator: Generator<'a, R>,
	min_length: usize,
	fallback_min_length: usize,
}

impl<'a, R: Rng> AnswerFilter<'a, R> {
	/// Wraps `generator` with the default answer lengths of `Config`.
	pub fn new(generator: Generator<'a, R>) -> Self {
		let config = Config::default();
		Self {
			generator,
			min_length: config.answer_min_length,
			fallback_min_length: config.fallback_min_length,
		}
	}

	/// Sets the shortest answer drawn and the shortest fallback answer drawn.
	pub fn with_lengths(mut self, min_length: usize, fallback_min_length: usize) -> Self {
		self.min_length = min_length;
		self.fallback_min_length = fallback_min_length;
		self
	}

	/// Answers `question` with at most `limit` tokens.
	///
	/// The question, without its closing marks, seeds the generation. The
	/// generated tokens are cleaned again with the generator's tokenizer,
	/// since the model may come from another tokenizer.
	///
	/// # Errors
	/// - [`Error::InvalidInput`] if the question does not end with `?`, has no
	///   usable word, or if `limit` is below the minimum answer length or the
	///   key length of the model
	/// - [`Error::ModelNotReady`] if the model is empty
	pub fn answer(&mut self, question: &str, limit: usize) -> Result<String> {
		let trimmed = question.trim();
		if trimmed.is_empty() || !trimmed.ends_with('?') {
			return Err(Error::InvalidInput(format!("{question:?} is not a question")));
		}

		// "cat?" would never match the key "cat"
		let seed = trimmed.trim_end_matches(CLOSING_MARKS);
		let tokenizer = self.generator.tokenizer();
		let asked: HashSet<String> = tokenizer.clean(seed).into_iter().collect();
		if asked.is_empty() {
			return Err(Error::InvalidInput(format!("{question:?} has no usable word")));
		}

		let key_len = self.generator.model().key_len();
		let min_length = self.min_length.max(key_len);
		if limit < min_length {
			return Err(Error::InvalidInput(format!("answer limit must be >= {min_length}, got {limit}")));
		}
		if self.generator.model().is_empty() {
			return Err(Error::ModelNotReady);
		}

		let length = self.generator.rng().random_range(min_length..=limit);
		let generated = self.generator.generate(seed, length)?.join(" ");
		let answer: Vec<String> = tokenizer
			.clean(&generated)
			.into_iter()
			.filter(|token| !asked.contains(token))
			.collect();

		if !answer.is_empty() {
			return Ok(capitalize(&answer));
		}

		let floor = self.fallback_min_length.max(key_len).min(limit);
		let length = self.generator.rng().random_range(floor..=limit);
		debug!("answer only echoed {question:?}, regenerating {length} token(s) without filter");
		self.generator.generate_text("", length)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::builder::ModelBuilder;
	use crate::model::ngram_model::NGramModel;
	use crate::model::test_rng::FirstCandidate;
	use crate::text::stopwords::StopwordSet;
	use crate::text::tokenizer::Tokenizer;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	const CORPUS: &str = "Wisdom begins in wonder. Wonder leads to questions and questions lead to \
		knowledge. Knowledge without wisdom is dangerous. Love is patient, love is kind.";

	fn model(tokenizer: &Tokenizer) -> NGramModel {
		ModelBuilder::new(2).unwrap().build_from_text(CORPUS, tokenizer).unwrap()
	}

	#[test]
	fn rejects_non_questions() {
		let tokenizer = Tokenizer::default();
		let model = model(&tokenizer);
		let mut filter = AnswerFilter::new(Generator::new(&model, &tokenizer, FirstCandidate));

		for question in ["", "   ", "What is love", "Why? not"] {
			assert!(matches!(filter.answer(question, 20), Err(Error::InvalidInput(_))), "{question:?}");
		}
	}

	#[test]
	fn rejects_questions_without_words() {
		let tokenizer = Tokenizer::default();
		let model = model(&tokenizer);
		let mut filter = AnswerFilter::new(Generator::new(&model, &tokenizer, FirstCandidate));
		assert!(matches!(filter.answer("A b c?", 20), Err(Error::InvalidInput(_))));
	}

	#[test]
	fn rejects_small_limits() {
		let tokenizer = Tokenizer::default();
		let model = model(&tokenizer);
		let mut filter = AnswerFilter::new(Generator::new(&model, &tokenizer, FirstCandidate));
		assert!(matches!(filter.answer("What is wisdom?", 9), Err(Error::InvalidInput(_))));
		assert!(filter.answer("What is wisdom?", 10).is_ok());
	}

	#[test]
	fn empty_model_is_not_ready() {
		let tokenizer = Tokenizer::default();
		let model = NGramModel::new(2).unwrap();
		let mut filter = AnswerFilter::new(Generator::new(&model, &tokenizer, FirstCandidate));
		assert!(matches!(filter.answer("What is wisdom?", 20), Err(Error::ModelNotReady)));
	}

	#[test]
	fn answer_does_not_echo_the_question() {
		let tokenizer = Tokenizer::default();
		let model = model(&tokenizer);
		let mut filter = AnswerFilter::new(Generator::new(&model, &tokenizer, StdRng::seed_from_u64(21)));

		for _ in 0..20 {
			let answer = filter.answer("Where does wisdom begin?", 30).unwrap();
			assert!(!answer.is_empty());
			let words = tokenizer.clean(&answer);
			assert!(words.len() <= 30);
			assert!(!words.iter().any(|w| w == "wisdom"), "{answer}");
		}
	}

	#[test]
	fn falls_back_when_every_word_was_asked() {
		let tokenizer = Tokenizer::default();
		let model = ModelBuilder::new(2).unwrap().build_from_text("love love love love", &tokenizer).unwrap();
		let mut filter = AnswerFilter::new(Generator::new(&model, &tokenizer, StdRng::seed_from_u64(2)));

		let answer = filter.answer("Love love?", 12).unwrap();
		assert!(answer.starts_with("Love"));
	}

	#[test]
	fn answers_are_capitalized() {
		let tokenizer = Tokenizer::default();
		let model = model(&tokenizer);
		let mut filter = AnswerFilter::new(Generator::new(&model, &tokenizer, StdRng::seed_from_u64(4)));
		let answer = filter.answer("What is knowledge?", 15).unwrap();
		let first = answer.chars().next().unwrap();
		assert!(!first.is_lowercase(), "{answer}");
	}

	#[test]
	fn cleans_tokens_of_foreign_models() {
		let tokenizer = Tokenizer::default();
		let model = ModelBuilder::new(2)
			.unwrap()
			.build_from_text(
				"bread and butter and jam bread and butter",
				&Tokenizer::new(StopwordSet::empty()),
			)
			.unwrap();
		assert!(model.contains_key("and"));

		let mut filter = AnswerFilter::new(Generator::new(&model, &tokenizer, StdRng::seed_from_u64(8)));
		for _ in 0..20 {
			let answer = filter.answer("What about toast?", 12).unwrap();
			assert!(!answer.is_empty());
			assert!(!answer.split_whitespace().any(|w| w.eq_ignore_ascii_case("and")), "{answer}");
		}
	}

	#[test]
	fn question_seeds_the_answer() {
		let tokenizer = Tokenizer::default();
		let model = ModelBuilder::new(2)
			.unwrap()
			.build_from_text("the cat sat. the dog ran.", &tokenizer)
			.unwrap();
		let mut filter = AnswerFilter::new(Generator::new(&model, &tokenizer, FirstCandidate));

		// a random start would pick "cat" first and answer "Sat."
		assert_eq!(filter.answer("Where is the dog?", 20).unwrap(), "Ran.");
	}

	#[test]
	fn limit_must_fit_a_key() {
		let tokenizer = Tokenizer::default();
		let words = [
			"alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliet", "kilo",
			"lima",
		];
		let model = ModelBuilder::new(12).unwrap().build(&words).unwrap();
		let mut filter = AnswerFilter::new(Generator::new(&model, &tokenizer, FirstCandidate));

		assert!(matches!(filter.answer("What now?", 10), Err(Error::InvalidInput(_))));
		assert_eq!(filter.answer("What now?", 11).unwrap().split_whitespace().count(), 11);
	}
}
