//! Text handling around the model: cleaning raw input into tokens and
//! formatting generated tokens back into text.

/// Punctuation stripping, lowercasing and word filtering.
pub mod tokenizer;

/// Exclusion set consulted by the tokenizer.
pub mod stopwords;

/// Final formatting of generated tokens.
pub mod capitalize;
