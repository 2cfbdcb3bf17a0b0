use rand::Rng;

use crate::error::{OnomaError, Result};
use super::token::Token;
use super::trie::FrequencyTrie;

/// Generates new token sequences by weighted random walks over a built trie.
///
/// The random source is injected rather than pulled from global state, so
/// generation is deterministic and testable under a seeded generator.
///
/// # Responsibilities
/// - Walk the trie context by context, drawing the next token with
///   probability proportional to its weight
/// - Detect structurally broken models (`EmptyContext`)
/// - Render the finished sequence as a display string
///
/// # Notes
/// Sequence length is unbounded: termination relies on the sentinel being
/// reachable from every context, which holds for any trie built from real
/// training data.
pub struct Sampler<'a, R: Rng> {
	trie: &'a FrequencyTrie,
	rng: R,
}

impl<'a, R: Rng> Sampler<'a, R> {
	/// Creates a sampler over a built or loaded trie.
	pub fn new(trie: &'a FrequencyTrie, rng: R) -> Self {
		Self { trie, rng }
	}

	/// Generates one string.
	///
	/// # Errors
	/// Returns `EmptyContext` when the walk reaches a context with no leaf
	/// map, or one whose total weight is zero. Both are impossible for a
	/// well-formed trie and checked defensively.
	pub fn sample(&mut self) -> Result<String> {
		let depth = self.trie.depth();
		let mut sequence = vec![Token::Sentinel; depth];

		loop {
			let context = &sequence[sequence.len() - depth..];
			let leaf = self.trie.leaf(context).ok_or(OnomaError::EmptyContext)?;
			let total: f64 = leaf.values().sum();
			if total <= 0.0 {
				return Err(OnomaError::EmptyContext);
			}

			let cutoff = self.rng.random_range(0.0..total);
			let mut running = 0.0;
			let mut selected = None;
			for (token, weight) in leaf {
				running += weight;
				// Keep the last entry as fallback against the running sum
				// landing a rounding error short of the total.
				selected = Some(token);
				if running >= cutoff {
					break;
				}
			}
			let token = selected.cloned().ok_or(OnomaError::EmptyContext)?;

			sequence.push(token.clone());
			if token.is_sentinel() && sequence.len() > depth {
				break;
			}
		}

		// Strip the leading padding and the trailing terminator.
		Ok(render(&sequence[depth..sequence.len() - 1]))
	}

	/// Generates `count` independent strings.
	pub fn sample_many(&mut self, count: usize) -> Result<Vec<String>> {
		(0..count).map(|_| self.sample()).collect()
	}
}

/// Renders a generated token sequence for display.
///
/// Character models (every token a single character) join with nothing;
/// word models join with single spaces. The first character is uppercased.
fn render(tokens: &[Token]) -> String {
	let parts: Vec<&str> = tokens.iter().map(|t| t.render()).collect();
	let joined = if tokens.iter().all(|t| t.is_single_char()) {
		parts.concat()
	} else {
		parts.join(" ")
	};
	capitalize(&joined)
}

/// Uppercases the first character of a string (UTF-8 aware).
fn capitalize(value: &str) -> String {
	let mut chars = value.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}
