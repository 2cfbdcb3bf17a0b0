//! Frequency-trie based synthetic token generation library.
//!
//! This crate provides a variable-order frequency model trained on weighted
//! example data (word frequency lists, place-name lists, corpora) and used
//! to generate plausible new tokens, including:
//! - A depth-bounded frequency trie with stable enumeration
//! - Two-pass building with statistical debiasing
//! - A self-describing flat text format plus a binary fast-load cache
//! - Deterministic, seedable weighted sampling
//!
//! The surrounding programs (argument parsing, console reporting) are kept
//! out of this crate; they hand the core already-opened streams and
//! already-parsed lines, and consume the generated strings.

/// Core trie, builder, codec, sampler and input-handling logic.
pub mod model;

/// Crate-wide error type and result alias.
pub mod error;

/// I/O utilities (file loading, path helpers).
///
/// Not exposed
pub(crate) mod io;
