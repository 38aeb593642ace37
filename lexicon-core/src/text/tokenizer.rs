use super::stopwords::StopwordSet;

/// Punctuation kept inside tokens, everything else that is not a word
/// character or whitespace is stripped.
const KEPT_PUNCTUATION: &[char] = &['\'', '-', ',', '.', '!', '?'];

/// Tokens of this many characters or less are dropped.
const MIN_TOKEN_CHARS: usize = 2;

/// Turns raw text into cleaned tokens.
///
/// A token is lowercase, holds only word characters and the punctuation in
/// [`KEPT_PUNCTUATION`], is longer than two characters and is not a stopword.
#[derive(Clone, Debug, Default)]
pub struct Tokenizer {
	stopwords: StopwordSet,
}

impl Tokenizer {
	pub fn new(stopwords: StopwordSet) -> Self {
		Self { stopwords }
	}

	pub fn stopwords(&self) -> &StopwordSet {
		&self.stopwords
	}

	/// Cleans `text` with this tokenizer's stopword set.
	pub fn clean(&self, text: &str) -> Vec<String> {
		clean(text, &self.stopwords)
	}
}

/// Cleans `text` into an ordered token sequence.
///
/// Returns an empty vector when nothing survives; callers decide whether
/// that is an error.
pub fn clean(text: &str, stopwords: &StopwordSet) -> Vec<String> {
	let lowered: String = text
		.to_lowercase()
		.chars()
		.filter(|c| is_kept(*c))
		.collect();

	lowered
		.split_whitespace()
		.filter(|word| word.chars().count() > MIN_TOKEN_CHARS)
		.filter(|word| !stopwords.contains(word))
		.map(str::to_owned)
		.collect()
}

fn is_kept(c: char) -> bool {
	c.is_alphanumeric() || c == '_' || c.is_whitespace() || KEPT_PUNCTUATION.contains(&c)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lowercases_and_keeps_sentence_punctuation() {
		let tokens = clean("The Cat SAT. Really?!", &StopwordSet::empty());
		assert_eq!(tokens, vec!["the", "cat", "sat.", "really?!"]);
	}

	#[test]
	fn strips_other_symbols() {
		let tokens = clean("«hello» (world) l'homme; self-made, #tag", &StopwordSet::empty());
		assert_eq!(tokens, vec!["hello", "world", "l'homme", "self-made,", "tag"]);
	}

	#[test]
	fn drops_short_words_and_stopwords() {
		let stopwords = StopwordSet::new(["cheese"]);
		let tokens = clean("I am a big fan of cheese and wine", &stopwords);
		assert_eq!(tokens, vec!["big", "fan", "and", "wine"]);
	}

	#[test]
	fn counts_characters_not_bytes() {
		let tokens = clean("été où çà", &StopwordSet::empty());
		assert_eq!(tokens, vec!["été"]);
	}

	#[test]
	fn collapses_whitespace_runs() {
		let tokens = clean("  one\t\ttwo \n\n three  ", &StopwordSet::empty());
		assert_eq!(tokens, vec!["one", "two", "three"]);
	}

	#[test]
	fn empty_or_filtered_input_yields_nothing() {
		assert!(clean("", &StopwordSet::default()).is_empty());
		assert!(clean("   ", &StopwordSet::default()).is_empty());
		assert!(clean("a b .. ?? @#$%", &StopwordSet::default()).is_empty());
	}

	#[test]
	fn tokenizer_uses_its_stopwords() {
		let tokenizer = Tokenizer::default();
		assert_eq!(tokenizer.clean("bread and butter"), vec!["bread", "butter"]);
	}
}
