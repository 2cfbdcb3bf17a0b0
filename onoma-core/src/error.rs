use thiserror::Error;

/// Convenient result type used throughout the crate.
pub type Result<T, E = OnomaError> = std::result::Result<T, E>;

/// Errors raised while loading, saving, or sampling a frequency model.
///
/// Rejected training lines are deliberately not represented here: the
/// expression source counts and logs them, then skips the line.
#[derive(Debug, Error)]
pub enum OnomaError {
	/// A context reached during sampling has no leaf map, or a leaf map
	/// whose total weight is zero. Structurally impossible for a well-formed
	/// trie, checked defensively.
	#[error("sampling reached a context with no usable next-token")]
	EmptyContext,

	/// A model line's field count disagrees with the depth inferred from
	/// the first line.
	#[error("malformed model line {line}: expected {expected} fields, found {found}")]
	MalformedLine { line: usize, expected: usize, found: usize },

	/// A model line's trailing weight field is not a number.
	#[error("invalid weight {value:?} on model line {line}")]
	InvalidWeight { line: usize, value: String },

	/// Two model lines describe the same trie path.
	#[error("duplicate path on model line {line}")]
	DuplicatePath { line: usize },

	/// A model file with no lines has no inferable depth.
	#[error("model file contains no lines")]
	EmptyModel,

	/// Filesystem error while reading or writing a model.
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),

	/// Binary cache serialization failure.
	#[error("binary model error: {0}")]
	Binary(String),
}

impl From<postcard::Error> for OnomaError {
	fn from(err: postcard::Error) -> Self {
		Self::Binary(err.to_string())
	}
}
