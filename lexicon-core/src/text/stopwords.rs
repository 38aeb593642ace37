use std::collections::HashSet;

/// Words dropped by the default [`StopwordSet`].
///
/// Tokens of two characters or less are already removed by the tokenizer,
/// so only longer function words are listed here.
pub const DEFAULT_STOPWORDS: &[&str] = &[
	"and", "but", "for", "nor", "yet", "from", "with", "into", "onto", "upon",
];

/// Immutable set of tokens excluded while cleaning text.
///
/// Entries are lowercased on construction so that lookups match the
/// lowercase tokens produced by the tokenizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StopwordSet {
	words: HashSet<String>,
}

impl StopwordSet {
	/// Builds a set from any list of words.
	pub fn new<I, S>(words: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		Self {
			words: words
				.into_iter()
				.map(|w| w.as_ref().trim().to_lowercase())
				.filter(|w| !w.is_empty())
				.collect(),
		}
	}

	/// A set that excludes nothing.
	pub fn empty() -> Self {
		Self { words: HashSet::new() }
	}

	pub fn contains(&self, token: &str) -> bool {
		self.words.contains(token)
	}

	pub fn len(&self) -> usize {
		self.words.len()
	}

	pub fn is_empty(&self) -> bool {
		self.words.is_empty()
	}
}

impl Default for StopwordSet {
	fn default() -> Self {
		Self::new(DEFAULT_STOPWORDS)
	}
}
