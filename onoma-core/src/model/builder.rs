use super::expression::WeightedExpression;
use super::token::Token;
use super::trie::FrequencyTrie;

/// Leaf weights below this value are deleted after the debiasing pass.
/// Also swallows any negative residue left by inconsistent retractions.
const PRUNE_EPSILON: f64 = 1e-5;

/// Builds a `FrequencyTrie` from weighted expressions.
///
/// Construction is two-pass. The insert phase slides a sentinel-padded
/// window over each expression and accumulates its weight along the way.
/// The debiasing phase then re-walks every expression: a chain that never
/// made the trie branch carries no discriminative information and would
/// bias sampling toward verbatim reproduction of rare training entries, so
/// its contribution is retracted and swept away.
///
/// # Invariants
/// - Expressions added are retained until `build` so the debias walk can
///   revisit the exact insertion path
/// - `build` consumes the builder; the returned trie is final
pub struct TrieBuilder {
	trie: FrequencyTrie,
	expressions: Vec<WeightedExpression>,
}

impl TrieBuilder {
	/// Creates a builder producing a trie of the given look-back depth.
	pub fn new(depth: usize) -> Self {
		Self { trie: FrequencyTrie::new(depth), expressions: Vec::new() }
	}

	/// Inserts one weighted expression.
	///
	/// The window starts as `depth` sentinels, so expressions shorter than
	/// the depth still insert correctly; a final write under the sentinel
	/// records sequence termination.
	pub fn add(&mut self, expression: WeightedExpression) {
		let depth = self.trie.depth();
		let mut window = vec![Token::Sentinel; depth];

		for token in &expression.tokens {
			self.trie.increment(&window, token.clone(), expression.weight);
			Self::slide(&mut window, token.clone());
		}
		self.trie.increment(&window, Token::Sentinel, expression.weight);

		self.expressions.push(expression);
	}

	/// Runs the debiasing pass and returns the finished trie.
	pub fn build(mut self) -> FrequencyTrie {
		self.debias();
		self.sweep();
		self.trie
	}

	/// Drops the oldest window token and appends the newest.
	fn slide(window: &mut Vec<Token>, token: Token) {
		if !window.is_empty() {
			window.remove(0);
			window.push(token);
		}
	}

	/// Retracts the weight of every non-informative expression.
	///
	/// An expression is informative when at least one context visited from
	/// index `depth` onward (i.e. once the window is free of padding) has a
	/// leaf map with more than one entry — somewhere, the model had a real
	/// choice to make. Otherwise the expression's weight is subtracted back
	/// at every `(context, written-token)` pair of its insertion path.
	fn debias(&mut self) {
		let depth = self.trie.depth();
		let mut retracted = 0usize;

		for expression in &self.expressions {
			let mut window = vec![Token::Sentinel; depth];
			let mut visited = Vec::with_capacity(expression.tokens.len() + 1);

			for token in &expression.tokens {
				visited.push((window.clone(), token.clone()));
				Self::slide(&mut window, token.clone());
			}
			visited.push((window, Token::Sentinel));

			let informative = visited
				.iter()
				.skip(depth)
				.any(|(context, _)| self.trie.leaf(context).is_some_and(|leaf| leaf.len() > 1));

			if !informative {
				for (context, token) in &visited {
					self.trie.increment(context, token.clone(), -expression.weight);
				}
				retracted += 1;
			}
		}

		if retracted > 0 {
			log::debug!("retracted {} non-informative expressions", retracted);
		}
	}

	/// Deletes every leaf whose weight fell below `PRUNE_EPSILON`.
	fn sweep(&mut self) {
		let doomed: Vec<(Vec<Token>, Token)> = self
			.trie
			.entries()
			.filter(|(_, _, weight)| *weight < PRUNE_EPSILON)
			.map(|(context, token, _)| (context.to_vec(), token.clone()))
			.collect();

		for (context, token) in &doomed {
			self.trie.delete(context, token);
		}

		if !doomed.is_empty() {
			log::debug!("swept {} near-zero leaves", doomed.len());
		}
	}
}
