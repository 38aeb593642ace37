use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Next-token distribution of one n-gram key.
///
/// Conceptually a node of the Markov chain: outgoing edges are the observed
/// next tokens, weighted by how many times they followed the key.
///
/// ## Invariants
/// - Every occurrence count is strictly positive
/// - Each next token appears once
/// - Transitions keep first-seen order, the sampler walks them in that order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct State {
	transitions: Vec<(String, usize)>,
}

impl State {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records an occurrence of a transition toward `next`.
	///
	/// - If the transition already exists, its occurrence count is increased.
	/// - Otherwise it is appended with an initial count of 1.
	pub fn add_transition(&mut self, next: &str) {
		self.add_occurrences(next, 1);
	}

	fn add_occurrences(&mut self, next: &str, occurrences: usize) {
		match self.transitions.iter_mut().find(|(token, _)| token == next) {
			Some((_, count)) => *count += occurrences,
			None => self.transitions.push((next.to_owned(), occurrences)),
		}
	}

	/// Transitions in first-seen order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
		self.transitions.iter().map(|(token, count)| (token.as_str(), *count))
	}

	/// Occurrence count of `next`, 0 when never observed.
	pub fn count(&self, next: &str) -> usize {
		self.iter().find(|(token, _)| *token == next).map_or(0, |(_, count)| count)
	}

	/// Sum of all occurrence counts.
	pub fn total(&self) -> usize {
		self.transitions.iter().map(|(_, count)| count).sum()
	}

	pub fn len(&self) -> usize {
		self.transitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.transitions.is_empty()
	}

	/// Merges another state of the same key into this one.
	///
	/// Counts are summed. Tokens only known by `other` are appended after
	/// the existing ones, in `other`'s order.
	pub fn merge(&mut self, other: &Self) {
		for (token, count) in other.iter() {
			self.add_occurrences(token, count);
		}
	}
}

/// A state is written as a plain `token -> count` map, in transition order.
impl Serialize for State {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.transitions.len()))?;
		for (token, count) in &self.transitions {
			map.serialize_entry(token, count)?;
		}
		map.end()
	}
}

impl<'de> Deserialize<'de> for State {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_map(StateVisitor)
	}
}

struct StateVisitor;

impl<'de> Visitor<'de> for StateVisitor {
	type Value = State;

	fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
		formatter.write_str("a map of next tokens to positive occurrence counts")
	}

	fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
		let mut state = State {
			transitions: Vec::with_capacity(access.size_hint().unwrap_or(0)),
		};

		while let Some((token, count)) = access.next_entry::<String, usize>()? {
			if token.is_empty() || token.chars().any(char::is_whitespace) {
				return Err(de::Error::custom(format!("invalid next token {token:?}")));
			}
			if count == 0 {
				return Err(de::Error::custom(format!("zero count for next token {token:?}")));
			}
			if state.count(&token) > 0 {
				return Err(de::Error::custom(format!("duplicate next token {token:?}")));
			}
			state.transitions.push((token, count));
		}

		if state.is_empty() {
			return Err(de::Error::custom("state without transitions"));
		}
		Ok(state)
	}
}
