use std::path::Path;
use std::sync::mpsc;
use std::thread;

use crate::error::Result;
use crate::io::read_file;
use super::codec::SEPARATOR;
use super::token::Token;

/// Accepts or rejects a raw token before it reaches the builder.
///
/// The rule is a fixed character class: alphabetic characters plus `-` and
/// `'`, with the codec's field separator excluded outright so that every
/// accepted token can be serialized safely. Empty tokens are rejected
/// because the empty field is reserved for the sentinel on disk.
#[derive(Clone, Copy, Debug)]
pub struct TokenValidator {
	separator: char,
}

impl TokenValidator {
	/// Creates a validator excluding the given field separator.
	pub fn new(separator: char) -> Self {
		Self { separator }
	}

	/// Returns true when every character of `token` is allowed.
	pub fn validate(&self, token: &str) -> bool {
		!token.is_empty()
			&& token.chars().all(|c| {
				c != self.separator && (c.is_alphabetic() || c == '-' || c == '\'')
			})
	}
}

impl Default for TokenValidator {
	fn default() -> Self {
		Self::new(SEPARATOR)
	}
}

/// How a training line's text is split into tokens.
///
/// # Variants
/// - `Characters`: each character of the text is one token (letter model).
/// - `Words`: the text splits on whitespace into word tokens (sentence model).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tokenization {
	Characters,
	Words,
}

/// One training example: a non-negative weight and its token sequence.
///
/// Fractional weights are allowed so that corpora can be merged with
/// relative importance factors.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightedExpression {
	pub weight: f64,
	pub tokens: Vec<Token>,
}

/// Parses raw `"<weight> <text>"` training lines into weighted expressions.
///
/// # Responsibilities
/// - Split each line into its weight and text parts
/// - Lowercase and tokenize the text per the configured `Tokenization`
/// - Reject lines carrying an invalid weight or an invalid token
///
/// Rejects are non-fatal: the line is counted, logged, and skipped.
pub struct ExpressionSource {
	mode: Tokenization,
	validator: TokenValidator,
	rejected: usize,
}

impl ExpressionSource {
	/// Creates a source for the given tokenization mode with the default
	/// validator.
	pub fn new(mode: Tokenization) -> Self {
		Self { mode, validator: TokenValidator::default(), rejected: 0 }
	}

	/// Number of lines rejected so far.
	pub fn rejected(&self) -> usize {
		self.rejected
	}

	/// Parses one raw line, or rejects it.
	///
	/// Returns `None` for rejected lines; the reject counter is bumped and
	/// a warning is logged with the offending line.
	pub fn parse_line(&mut self, line: &str) -> Option<WeightedExpression> {
		let Some((count, text)) = line.split_once(' ') else {
			return self.reject(line);
		};
		let weight: f64 = match count.parse() {
			Ok(w) if w >= 0.0 => w,
			_ => return self.reject(line),
		};

		let text = text.trim().to_lowercase();
		let tokens = match self.mode {
			Tokenization::Characters => {
				if !self.validator.validate(&text) {
					return self.reject(line);
				}
				text.chars().map(|c| Token::Text(c.to_string())).collect()
			}
			Tokenization::Words => {
				let words: Vec<&str> = text.split_whitespace().collect();
				if words.is_empty() || words.iter().any(|w| !self.validator.validate(w)) {
					return self.reject(line);
				}
				words.into_iter().map(Token::text).collect()
			}
		};

		Some(WeightedExpression { weight, tokens })
	}

	fn reject(&mut self, line: &str) -> Option<WeightedExpression> {
		self.rejected += 1;
		log::warn!("rejected training line: {:?}", line);
		None
	}
}

/// Reads a corpus file and parses every line in parallel.
///
/// # Behavior
/// - Splits the lines into chunks (CPU cores * factor).
/// - Spawns one thread per chunk, each running its own `ExpressionSource`.
/// - Collects expressions and reject counts over an MPSC channel.
///
/// # Returns
/// The accepted expressions (order unspecified) and the total number of
/// rejected lines.
pub fn read_corpus<P: AsRef<Path>>(
	path: P,
	mode: Tokenization,
) -> Result<(Vec<WeightedExpression>, usize)> {
	let lines = read_file(path)?;
	let cpus = num_cpus::get();
	let factor = 8;
	let chunks = cpus * factor;
	let chunk_size = ((lines.len() + chunks - 1) / chunks).max(1);

	let (tx, rx) = mpsc::channel();
	for chunk in lines.chunks(chunk_size) {
		let tx = tx.clone();
		let chunk: Vec<String> = chunk.to_vec();

		thread::spawn(move || {
			let mut source = ExpressionSource::new(mode);
			let expressions: Vec<WeightedExpression> =
				chunk.iter().filter_map(|line| source.parse_line(line)).collect();
			tx.send((expressions, source.rejected())).expect("Failed to send from thread");
		});
	}
	drop(tx);

	let mut expressions = Vec::new();
	let mut rejected = 0;
	for (partial, partial_rejected) in rx.iter() {
		expressions.extend(partial);
		rejected += partial_rejected;
	}

	if rejected > 0 {
		log::warn!("rejected {} invalid training lines", rejected);
	}

	Ok((expressions, rejected))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn validator_enforces_character_class() {
		let validator = TokenValidator::default();
		assert!(validator.validate("grand-rue"));
		assert!(validator.validate("l'ours"));
		assert!(validator.validate("été"));
		assert!(!validator.validate("a#b"));
		assert!(!validator.validate("12ab"));
		assert!(!validator.validate(""));
	}

	#[test]
	fn character_mode_splits_into_letter_tokens() {
		let mut source = ExpressionSource::new(Tokenization::Characters);
		let expression = source.parse_line("3 Ab").expect("line should parse");
		assert_eq!(expression.weight, 3.0);
		assert_eq!(expression.tokens, vec![Token::text("a"), Token::text("b")]);
	}

	#[test]
	fn word_mode_splits_on_whitespace() {
		let mut source = ExpressionSource::new(Tokenization::Words);
		let expression = source.parse_line("0.5 Grand Chien").expect("line should parse");
		assert_eq!(expression.weight, 0.5);
		assert_eq!(expression.tokens, vec![Token::text("grand"), Token::text("chien")]);
	}

	#[test]
	fn invalid_lines_are_counted_not_fatal() {
		let mut source = ExpressionSource::new(Tokenization::Characters);
		assert!(source.parse_line("x ab").is_none()); // bad weight
		assert!(source.parse_line("-1 ab").is_none()); // negative weight
		assert!(source.parse_line("2 a#b").is_none()); // separator in token
		assert!(source.parse_line("nospace").is_none()); // no text part
		assert_eq!(source.rejected(), 4);
		assert!(source.parse_line("2 ab").is_some());
		assert_eq!(source.rejected(), 4);
	}
}
