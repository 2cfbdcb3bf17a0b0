use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::token::Token;

/// A context-indexed table of next-token weights with a fixed look-back
/// depth.
///
/// Conceptually the trie is a tree of nesting level `depth + 1`: internal
/// levels map a token to a child node and the final level (the "leaf map")
/// maps a next-token to a weight. It is stored flat — one map keyed by the
/// full context — which keeps ownership simple and collapses ancestor
/// garbage collection into a single map removal.
///
/// # Responsibilities
/// - Accumulate weighted transition counts during learning
/// - Answer `context × next-token → weight` lookups
/// - Enumerate every leaf for serialization
/// - Report the number of effective branch points (`bifurcations`)
///
/// # Invariants
/// - Every stored context has length exactly `depth`
/// - All weights are >= 0 once building is complete
/// - No empty leaf map is retained (`delete` drops emptied contexts)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FrequencyTrie {
	/// Number of look-back tokens indexing each leaf map.
	depth: usize,

	/// Mapping from a full context (length `depth`) to its leaf map.
	/// Ordered so that iteration and serialization are stable.
	contexts: BTreeMap<Vec<Token>, BTreeMap<Token, f64>>,
}

impl FrequencyTrie {
	/// Creates an empty trie with the given look-back depth.
	pub fn new(depth: usize) -> Self {
		Self { depth, contexts: BTreeMap::new() }
	}

	/// Returns the look-back depth fixed at construction.
	pub fn depth(&self) -> usize {
		self.depth
	}

	/// True when the trie holds no leaf at all.
	pub fn is_empty(&self) -> bool {
		self.contexts.is_empty()
	}

	/// Returns the weight stored under `context ++ [token]`.
	///
	/// Defaults to 0.0 when the path is absent; reading never creates
	/// intermediate nodes.
	pub fn get(&self, context: &[Token], token: &Token) -> f64 {
		self.contexts
			.get(context)
			.and_then(|leaf| leaf.get(token))
			.copied()
			.unwrap_or(0.0)
	}

	/// Returns the leaf map for a context, if any.
	pub fn leaf(&self, context: &[Token]) -> Option<&BTreeMap<Token, f64>> {
		self.contexts.get(context)
	}

	/// Adds `amount` to the weight under `context ++ [token]`, creating the
	/// leaf map as needed.
	///
	/// `amount` may be negative; the builder uses this to retract the
	/// contribution of non-informative expressions.
	pub fn increment(&mut self, context: &[Token], token: Token, amount: f64) {
		debug_assert_eq!(context.len(), self.depth);
		let leaf = self.contexts.entry(context.to_vec()).or_default();
		*leaf.entry(token).or_insert(0.0) += amount;
	}

	/// Sets the weight under `context ++ [token]` outright.
	///
	/// Returns the previous value if the path already existed; the codec
	/// relies on this to detect duplicate lines in a model file.
	pub(crate) fn set(&mut self, context: &[Token], token: Token, weight: f64) -> Option<f64> {
		debug_assert_eq!(context.len(), self.depth);
		self.contexts.entry(context.to_vec()).or_default().insert(token, weight)
	}

	/// Removes the entry under `context ++ [token]`.
	///
	/// A context whose leaf map empties is removed with it, so the trie
	/// never retains dangling empty branches.
	pub fn delete(&mut self, context: &[Token], token: &Token) {
		if let Some(leaf) = self.contexts.get_mut(context) {
			leaf.remove(token);
			if leaf.is_empty() {
				self.contexts.remove(context);
			}
		}
	}

	/// Iterates over every `(context, next-token, weight)` leaf entry.
	///
	/// The iterator is lazy and restartable; order follows the map ordering
	/// and is stable across calls.
	pub fn entries(&self) -> impl Iterator<Item = (&[Token], &Token, f64)> + '_ {
		self.contexts.iter().flat_map(|(context, leaf)| {
			leaf.iter().map(move |(token, weight)| (context.as_slice(), token, *weight))
		})
	}

	/// Counts the effective branch points of the model.
	///
	/// Each leaf map contributes `entries - 1`: a context with a single
	/// possible next-token decides nothing. Purely a richness metric for
	/// reporting; correctness never depends on it.
	pub fn bifurcations(&self) -> usize {
		self.contexts.values().map(|leaf| leaf.len().saturating_sub(1)).sum()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn context(tokens: &[&str]) -> Vec<Token> {
		tokens.iter().map(|t| Token::text(t)).collect()
	}

	#[test]
	fn get_defaults_to_zero_without_creating_nodes() {
		let trie = FrequencyTrie::new(2);
		assert_eq!(trie.get(&context(&["a", "b"]), &Token::text("c")), 0.0);
		assert!(trie.is_empty());
	}

	#[test]
	fn increment_accumulates() {
		let mut trie = FrequencyTrie::new(1);
		let ctx = context(&["a"]);
		trie.increment(&ctx, Token::text("b"), 2.0);
		trie.increment(&ctx, Token::text("b"), 0.5);
		assert_eq!(trie.get(&ctx, &Token::text("b")), 2.5);
	}

	#[test]
	fn delete_garbage_collects_emptied_contexts() {
		let mut trie = FrequencyTrie::new(1);
		let ctx = context(&["a"]);
		trie.increment(&ctx, Token::text("b"), 1.0);
		trie.increment(&ctx, Token::text("c"), 1.0);

		trie.delete(&ctx, &Token::text("b"));
		assert!(trie.leaf(&ctx).is_some());

		trie.delete(&ctx, &Token::text("c"));
		assert!(trie.leaf(&ctx).is_none());
		assert!(trie.is_empty());
	}

	#[test]
	fn entries_is_restartable_and_stable() {
		let mut trie = FrequencyTrie::new(1);
		trie.increment(&context(&["b"]), Token::text("x"), 1.0);
		trie.increment(&context(&["a"]), Token::text("y"), 2.0);

		let first: Vec<_> = trie.entries().collect();
		let second: Vec<_> = trie.entries().collect();
		assert_eq!(first, second);
		assert_eq!(first.len(), 2);
	}

	#[test]
	fn bifurcations_counts_branch_points() {
		let mut trie = FrequencyTrie::new(1);
		// One context with two choices, one with a single choice.
		trie.increment(&context(&["a"]), Token::text("b"), 3.0);
		trie.increment(&context(&["a"]), Token::text("c"), 1.0);
		trie.increment(&context(&["b"]), Token::Sentinel, 3.0);
		assert_eq!(trie.bifurcations(), 1);
	}

	#[test]
	fn depth_zero_uses_the_empty_context() {
		let mut trie = FrequencyTrie::new(0);
		trie.increment(&[], Token::text("a"), 3.0);
		trie.increment(&[], Token::text("b"), 1.0);
		assert_eq!(trie.bifurcations(), 1);
		assert_eq!(trie.get(&[], &Token::text("a")), 3.0);
	}
}
