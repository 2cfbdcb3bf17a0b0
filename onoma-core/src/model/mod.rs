//! Top-level module for the frequency-trie generation system.
//!
//! This crate provides a variable-order synthetic token generator, including:
//! - The core frequency trie (`FrequencyTrie`)
//! - Two-pass construction with debiasing (`TrieBuilder`)
//! - A flat line-oriented text codec with a binary fast-load cache
//! - Weighted random sampling (`Sampler`)
//! - Training-input validation and parsing (`ExpressionSource`)

/// The token alphabet: text tokens plus the reserved sentinel.
pub mod token;

/// The core data structure: a depth-bounded, context-indexed table of
/// next-token weights.
///
/// Supports accumulation, deletion with garbage collection, stable
/// enumeration, and the `bifurcations` richness metric.
pub mod trie;

/// Two-pass trie construction.
///
/// Inserts weighted expressions through a sentinel-padded sliding window,
/// then retracts chains that never made the model branch.
pub mod builder;

/// Serialization of tries to and from the flat `#`-delimited text format,
/// with a `postcard` binary cache for fast reloading.
pub mod codec;

/// Weighted random walk generation over a built trie.
pub mod sampler;

/// Training input handling: token validation and parsing of weighted
/// `"<weight> <text>"` lines, with parallel corpus ingestion.
pub mod expression;
