use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use rand::Rng;
use rand::seq::IteratorRandom;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::state::State;
use crate::error::{Error, Result};

/// Word-level n-gram model.
///
/// Maps every key (the space-joined `n - 1` tokens of a window) to the
/// distribution of tokens observed right after it.
///
/// # Invariants
/// - `n` is always >= 2
/// - Every key holds exactly `n - 1` tokens
/// - Every state has at least one transition, all counts >= 1
///
/// Keys live in a sorted map so that iteration, and therefore random key
/// selection under a seeded RNG, is reproducible across runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NGramModel {
	/// The order of the model (number of tokens in a window, key + next)
	n: usize,

	/// Mapping from a key to its outgoing transitions
	states: BTreeMap<String, State>,
}

impl NGramModel {
	/// Creates a new empty model of order `n`.
	///
	/// # Errors
	/// Returns [`Error::InvalidInput`] if `n < 2`.
	pub fn new(n: usize) -> Result<Self> {
		if n < 2 {
			return Err(Error::InvalidInput(format!("n-gram size must be >= 2, got {n}")));
		}
		Ok(Self { n, states: BTreeMap::new() })
	}

	/// The order of the model.
	pub fn n(&self) -> usize {
		self.n
	}

	/// Number of tokens in a key (`n - 1`).
	pub fn key_len(&self) -> usize {
		self.n - 1
	}

	/// Number of distinct keys.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	pub fn state(&self, key: &str) -> Option<&State> {
		self.states.get(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.states.contains_key(key)
	}

	/// Keys and their states, in key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &State)> {
		self.states.iter().map(|(key, state)| (key.as_str(), state))
	}

	/// Returns a uniformly chosen key, `None` if the model is empty.
	pub fn random_key<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
		self.states.keys().choose(rng).map(String::as_str)
	}

	/// Records one occurrence of `next` after the window `key`.
	pub(crate) fn add_window(&mut self, key: String, next: &str) {
		self.states.entry(key).or_default().add_transition(next);
	}

	/// Merges another model into this one.
	///
	/// # Notes
	/// - Both models must have the same order `n`.
	/// - Counts for matching keys and transitions are summed.
	///
	/// # Errors
	/// Returns [`Error::InvalidInput`] if the model orders do not match.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.n != other.n {
			return Err(Error::InvalidInput(format!(
				"cannot merge a {}-gram model into a {}-gram model",
				other.n, self.n
			)));
		}

		for (key, state) in &other.states {
			match self.states.entry(key.clone()) {
				Entry::Occupied(mut existing) => existing.get_mut().merge(state),
				Entry::Vacant(slot) => {
					slot.insert(state.clone());
				}
			}
		}

		Ok(())
	}

	/// Serializes the model to its JSON wire form.
	pub fn to_json(&self) -> Result<String> {
		Ok(serde_json::to_string(self)?)
	}

	/// Loads a model from its JSON wire form, validating every invariant.
	pub fn from_json(json: &str) -> Result<Self> {
		serde_json::from_str(json).map_err(|e| Error::CorruptModel(e.to_string()))
	}

	/// Serializes the model into the compact `postcard` binary form.
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		Ok(postcard::to_stdvec(self)?)
	}

	/// Loads a model from the `postcard` binary form.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		postcard::from_bytes(bytes).map_err(|e| Error::CorruptModel(e.to_string()))
	}

	/// Builds a model from already validated states, inferring `n` from
	/// the arity of the keys.
	fn from_states(states: BTreeMap<String, State>) -> std::result::Result<Self, String> {
		let mut arity = None;
		for key in states.keys() {
			let tokens = key.split(' ').collect::<Vec<_>>();
			if tokens.iter().any(|t| t.is_empty() || t.chars().any(char::is_whitespace)) {
				return Err(format!("malformed key {key:?}"));
			}
			match arity {
				None => arity = Some(tokens.len()),
				Some(expected) if expected != tokens.len() => {
					return Err(format!(
						"key {key:?} has {} token(s), expected {expected}",
						tokens.len()
					));
				}
				Some(_) => (),
			}
		}

		match arity {
			Some(key_len) => Ok(Self { n: key_len + 1, states }),
			None => Err("model has no n-gram".to_owned()),
		}
	}
}

/// Wire form: `{ key: { next: count, .. }, .. }`. The order `n` is not
/// stored, it is recovered from the key arity on load.
impl Serialize for NGramModel {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.states.len()))?;
		for (key, state) in &self.states {
			map.serialize_entry(key, state)?;
		}
		map.end()
	}
}

impl<'de> Deserialize<'de> for NGramModel {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		deserializer.deserialize_map(ModelVisitor)
	}
}

struct ModelVisitor;

impl<'de> Visitor<'de> for ModelVisitor {
	type Value = NGramModel;

	fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
		formatter.write_str("a map of n-gram keys to next-token distributions")
	}

	fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
		let mut states = BTreeMap::new();
		while let Some((key, state)) = access.next_entry::<String, State>()? {
			if states.insert(key.clone(), state).is_some() {
				return Err(de::Error::custom(format!("duplicate key {key:?}")));
			}
		}
		NGramModel::from_states(states).map_err(de::Error::custom)
	}
}

impl fmt::Display for NGramModel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}-gram model with {} key(s)", self.n, self.states.len())
	}
}
