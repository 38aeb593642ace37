use log::debug;
use rand::Rng;

use super::ngram_model::NGramModel;
use super::sampler::{History, Sampler};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::text::capitalize::capitalize;
use crate::text::tokenizer::Tokenizer;

/// Token-by-token text generation over a borrowed, read-only model.
///
/// # Responsibilities
/// - Turn a seed phrase into the starting key, falling back to a random key
/// - Extend the output with the sampler until the target length or a dead end
/// - Keep the bounded anti-repetition history
///
/// Several generators may share one model concurrently, each with its own RNG.
#[derive(Debug)]
pub struct Generator<'a, R> {
	model: &'a NGramModel,
	tokenizer: &'a Tokenizer,
	sampler: Sampler<R>,
	history: usize,
}

impl<'a, R: Rng> Generator<'a, R> {
	/// Creates a generator with the default history of `Config`.
	pub fn new(model: &'a NGramModel, tokenizer: &'a Tokenizer, rng: R) -> Self {
		Self {
			model,
			tokenizer,
			sampler: Sampler::new(rng),
			history: Config::default().history,
		}
	}

	/// Number of recent tokens the sampler avoids (0 disables it).
	pub fn with_history(mut self, history: usize) -> Self {
		self.history = history;
		self
	}

	pub fn model(&self) -> &'a NGramModel {
		self.model
	}

	pub fn tokenizer(&self) -> &'a Tokenizer {
		self.tokenizer
	}

	pub fn rng(&mut self) -> &mut R {
		self.sampler.rng()
	}

	/// Generates at most `target_length` tokens continuing `seed`.
	///
	/// The output starts with the cleaned seed when its last `n - 1` tokens
	/// form a known key, otherwise with a random key of the model. It then
	/// grows one sampled token at a time and stops early on a key without
	/// continuation.
	///
	/// # Errors
	/// - [`Error::ModelNotReady`] if the model is empty
	/// - [`Error::InvalidInput`] if `target_length < n - 1`
	pub fn generate(&mut self, seed: &str, target_length: usize) -> Result<Vec<String>> {
		let model = self.model;
		if model.is_empty() {
			return Err(Error::ModelNotReady);
		}
		let key_len = model.key_len();
		if target_length < key_len {
			return Err(Error::InvalidInput(format!(
				"length {target_length} is shorter than the {key_len} token(s) of a key"
			)));
		}

		let mut output = self.start(seed, target_length)?;
		let mut recent = History::new(self.history);
		recent.extend(&output);

		while output.len() < target_length {
			let key = output[output.len() - key_len..].join(" ");
			let Some(state) = model.state(&key) else {
				debug!("dead end on {key:?} after {} token(s)", output.len());
				break;
			};
			let Some(next) = self.sampler.choose(state, &recent) else {
				break;
			};
			recent.push(next);
			output.push(next.to_owned());
		}

		Ok(output)
	}

	/// [`generate`](Self::generate) then capitalize into display text.
	pub fn generate_text(&mut self, seed: &str, target_length: usize) -> Result<String> {
		Ok(capitalize(&self.generate(seed, target_length)?))
	}

	/// Resolves the starting tokens of a generation.
	fn start(&mut self, seed: &str, target_length: usize) -> Result<Vec<String>> {
		let key_len = self.model.key_len();
		let mut tokens = self.tokenizer.clean(seed);

		if tokens.len() >= key_len && self.model.contains_key(&tokens[tokens.len() - key_len..].join(" ")) {
			if tokens.len() > target_length {
				tokens.drain(..tokens.len() - target_length);
			}
			return Ok(tokens);
		}

		let model = self.model;
		let key = model.random_key(self.sampler.rng()).ok_or(Error::ModelNotReady)?;
		debug!("seed {seed:?} has no known key, starting from {key:?}");
		Ok(key.split(' ').map(str::to_owned).collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::builder::ModelBuilder;
	use crate::model::test_rng::FirstCandidate;
	use crate::text::stopwords::StopwordSet;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn cat_model() -> (NGramModel, Tokenizer) {
		let tokenizer = Tokenizer::default();
		let model = ModelBuilder::new(2)
			.unwrap()
			.build_from_text("the cat sat. the cat ran.", &tokenizer)
			.unwrap();
		(model, tokenizer)
	}

	#[test]
	fn stops_on_dead_end() {
		let (model, tokenizer) = cat_model();
		let mut generator = Generator::new(&model, &tokenizer, FirstCandidate);
		assert_eq!(generator.generate("the cat", 5).unwrap(), vec!["the", "cat", "sat."]);
	}

	#[test]
	fn any_draw_ends_the_sentence() {
		let (model, tokenizer) = cat_model();
		let mut generator = Generator::new(&model, &tokenizer, StdRng::seed_from_u64(9));
		for _ in 0..20 {
			let output = generator.generate("The CAT", 5).unwrap();
			assert_eq!(output.len(), 3);
			assert!(output[2] == "sat." || output[2] == "ran.");
		}
	}

	#[test]
	fn never_exceeds_target_length() {
		let tokenizer = Tokenizer::new(StopwordSet::empty());
		let model = ModelBuilder::new(2).unwrap().build(&["loop", "again", "loop", "again"]).unwrap();
		let mut generator = Generator::new(&model, &tokenizer, StdRng::seed_from_u64(5)).with_history(0);

		for length in 1..8 {
			let output = generator.generate("loop", length).unwrap();
			assert_eq!(output.len(), length);
		}
	}

	#[test]
	fn long_seed_is_trimmed_from_the_front() {
		let (model, tokenizer) = cat_model();
		let mut generator = Generator::new(&model, &tokenizer, FirstCandidate);
		let output = generator.generate("big old sleepy cat", 2).unwrap();
		assert_eq!(output, vec!["sleepy", "cat"]);
	}

	#[test]
	fn unknown_seed_starts_from_a_model_key() {
		let (model, tokenizer) = cat_model();
		let mut generator = Generator::new(&model, &tokenizer, StdRng::seed_from_u64(11));
		for seed in ["", "completely unrelated words", "zebra"] {
			let output = generator.generate(seed, 4).unwrap();
			assert!(model.contains_key(&output[0]), "started from {:?}", output[0]);
		}
	}

	#[test]
	fn empty_model_is_not_ready() {
		let model = NGramModel::new(2).unwrap();
		let tokenizer = Tokenizer::default();
		let mut generator = Generator::new(&model, &tokenizer, FirstCandidate);
		assert!(matches!(generator.generate("the cat", 5), Err(Error::ModelNotReady)));
	}

	#[test]
	fn length_must_fit_a_key() {
		let tokenizer = Tokenizer::new(StopwordSet::empty());
		let model = ModelBuilder::new(3).unwrap().build(&["one", "two", "three"]).unwrap();
		let mut generator = Generator::new(&model, &tokenizer, FirstCandidate);
		assert!(matches!(generator.generate("one two", 1), Err(Error::InvalidInput(_))));
		assert_eq!(generator.generate("one two", 2).unwrap(), vec!["one", "two"]);
		assert_eq!(generator.generate("one two", 9).unwrap(), vec!["one", "two", "three"]);
	}

	#[test]
	fn history_avoids_immediate_repetition() {
		let tokenizer = Tokenizer::new(StopwordSet::empty());
		// "ping" is followed by itself far more often than by "pong"
		let corpus = ["ping", "ping", "ping", "ping", "ping", "pong", "ping"];
		let model = ModelBuilder::new(2).unwrap().build(&corpus).unwrap();
		let mut generator = Generator::new(&model, &tokenizer, FirstCandidate).with_history(1);
		assert_eq!(generator.generate("ping", 3).unwrap(), vec!["ping", "pong", "ping"]);
	}

	#[test]
	fn unbounded_history_still_generates() {
		let (model, tokenizer) = cat_model();
		let mut generator = Generator::new(&model, &tokenizer, FirstCandidate).with_history(usize::MAX);
		assert_eq!(generator.generate("the cat", 5).unwrap(), vec!["the", "cat", "sat."]);
	}

	#[test]
	fn generate_text_capitalizes() {
		let (model, tokenizer) = cat_model();
		let mut generator = Generator::new(&model, &tokenizer, FirstCandidate);
		assert_eq!(generator.generate_text("the cat", 5).unwrap(), "The cat sat.");
	}
}
