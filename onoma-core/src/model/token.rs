use serde::{Deserialize, Serialize};

/// An atomic unit of the model's alphabet.
///
/// A token is either a real piece of text (a single character or a whole
/// word, the trie does not care which) or the reserved sentinel used for
/// start-of-sequence padding and end-of-sequence termination.
///
/// # Invariants
/// - `Sentinel` never appears in validated training input; it is a distinct
///   variant, so no text value can collide with it.
/// - Tokens are ordered (`Sentinel` first, then text lexicographically) so
///   that leaf maps iterate in a stable order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Token {
	Sentinel,
	Text(String),
}

impl Token {
	/// Creates a text token from a string slice.
	pub fn text(value: &str) -> Self {
		Self::Text(value.to_owned())
	}

	/// Returns true for the reserved padding/termination token.
	pub fn is_sentinel(&self) -> bool {
		matches!(self, Self::Sentinel)
	}

	/// Renders the token as a serialized field.
	///
	/// The sentinel becomes the empty field; the validator rejects empty
	/// tokens, so the two can never be confused on disk.
	pub(crate) fn render(&self) -> &str {
		match self {
			Self::Sentinel => "",
			Self::Text(value) => value,
		}
	}

	/// Parses a serialized field back into a token (inverse of `render`).
	pub(crate) fn parse_field(field: &str) -> Self {
		if field.is_empty() {
			Self::Sentinel
		} else {
			Self::Text(field.to_owned())
		}
	}

	/// True when the token renders as a single character.
	///
	/// Used to decide whether a generated sequence came from a
	/// character-level model (joined without separator) or a word-level
	/// model (joined with spaces).
	pub(crate) fn is_single_char(&self) -> bool {
		match self {
			Self::Sentinel => true,
			Self::Text(value) => value.chars().count() == 1,
		}
	}
}
