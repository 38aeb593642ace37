use std::collections::VecDeque;

use log::debug;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::state::State;

/// Bounded window of the most recently emitted tokens.
///
/// Holds at most `capacity` tokens, the oldest one is evicted first. A
/// capacity of 0 keeps nothing and disables anti-repetition.
#[derive(Clone, Debug)]
pub struct History {
	capacity: usize,
	tokens: VecDeque<String>,
}

impl History {
	pub fn new(capacity: usize) -> Self {
		Self {
			capacity,
			tokens: VecDeque::new(),
		}
	}

	pub fn push(&mut self, token: &str) {
		if self.capacity == 0 {
			return;
		}
		if self.tokens.len() == self.capacity {
			self.tokens.pop_front();
		}
		self.tokens.push_back(token.to_owned());
	}

	pub fn contains(&self, token: &str) -> bool {
		self.tokens.iter().any(|t| t == token)
	}

	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}
}

impl<S: AsRef<str>> Extend<S> for History {
	fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
		for token in iter {
			self.push(token.as_ref());
		}
	}
}

/// Weighted next-token selection with anti-repetition.
///
/// Owns the random source, so a seeded RNG makes every choice reproducible.
#[derive(Debug)]
pub struct Sampler<R> {
	rng: R,
}

impl<R: Rng> Sampler<R> {
	pub fn new(rng: R) -> Self {
		Self { rng }
	}

	pub fn rng(&mut self) -> &mut R {
		&mut self.rng
	}

	/// Picks the next token from `state`.
	///
	/// Candidates present in `recent` are skipped. Among the others a token
	/// is chosen with a probability proportional to its count: `r` is drawn
	/// in `[1, total]` and the first candidate, in first-seen order, whose
	/// cumulative count reaches `r` wins.
	///
	/// When `recent` excludes every candidate, a token is drawn uniformly
	/// from the whole distribution instead.
	///
	/// Returns `None` only for a state without transitions.
	pub fn choose<'s>(&mut self, state: &'s State, recent: &History) -> Option<&'s str> {
		let candidates: Vec<(&str, usize)> =
			state.iter().filter(|(token, _)| !recent.contains(token)).collect();

		let total: usize = candidates.iter().map(|(_, count)| count).sum();
		if total == 0 {
			let all: Vec<&str> = state.iter().map(|(token, _)| token).collect();
			let fallback = all.choose(&mut self.rng).copied();
			if fallback.is_some() {
				debug!("every candidate was recently used, picking uniformly among {}", all.len());
			}
			return fallback;
		}

		let r = self.rng.random_range(1..=total);
		let mut cumulative = 0;
		candidates.into_iter().find_map(|(token, count)| {
			cumulative += count;
			(cumulative >= r).then_some(token)
		})
	}
}
