use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{OnomaError, Result};
use crate::io::build_output_path;
use super::token::Token;
use super::trie::FrequencyTrie;

/// Reserved field delimiter of the text model format.
///
/// The token validator guarantees no accepted token contains it.
pub const SEPARATOR: char = '#';

/// Writes a trie as a flat leaf list, one line per entry.
///
/// Each line holds the `depth` context tokens, the next-token, and the
/// weight, joined by `SEPARATOR`. The sentinel renders as an empty field.
/// The tree shape is not written anywhere; it is reconstructed from shared
/// path prefixes on load.
///
/// # Returns
/// The number of lines written.
pub fn serialize<W: Write>(trie: &FrequencyTrie, writer: &mut W) -> Result<usize> {
	let mut written = 0;
	for (context, token, weight) in trie.entries() {
		for part in context {
			write!(writer, "{}{}", part.render(), SEPARATOR)?;
		}
		writeln!(writer, "{}{}{}", token.render(), SEPARATOR, weight)?;
		written += 1;
	}
	Ok(written)
}

/// Reconstructs a trie from its flat leaf list.
///
/// The depth is self-describing: the first line carries `depth + 1`
/// separators. Every subsequent line must carry the same field count.
///
/// # Errors
/// - `EmptyModel` when there is nothing to infer the depth from
/// - `MalformedLine` on a field count mismatch (fields are never silently
///   dropped or truncated)
/// - `InvalidWeight` when the trailing field does not parse
/// - `DuplicatePath` when two lines describe the same leaf
pub fn deserialize<R: BufRead>(reader: R) -> Result<FrequencyTrie> {
	let mut lines = Vec::new();
	for line in reader.lines() {
		let line = line?;
		if !line.is_empty() {
			lines.push(line);
		}
	}

	let first = lines.first().ok_or(OnomaError::EmptyModel)?;
	let depth = first
		.matches(SEPARATOR)
		.count()
		.checked_sub(1)
		.ok_or(OnomaError::MalformedLine { line: 1, expected: 2, found: 1 })?;

	let mut trie = FrequencyTrie::new(depth);
	for (index, line) in lines.iter().enumerate() {
		let fields: Vec<&str> = line.split(SEPARATOR).collect();
		if fields.len() != depth + 2 {
			return Err(OnomaError::MalformedLine {
				line: index + 1,
				expected: depth + 2,
				found: fields.len(),
			});
		}

		let weight: f64 = fields[depth + 1].parse().map_err(|_| OnomaError::InvalidWeight {
			line: index + 1,
			value: fields[depth + 1].to_owned(),
		})?;
		let context: Vec<Token> = fields[..depth].iter().map(|f| Token::parse_field(f)).collect();
		let token = Token::parse_field(fields[depth]);

		if trie.set(&context, token, weight).is_some() {
			return Err(OnomaError::DuplicatePath { line: index + 1 });
		}
	}

	Ok(trie)
}

/// Saves a trie to a text model file.
///
/// Returns the number of lines written.
pub fn save_model<P: AsRef<Path>>(trie: &FrequencyTrie, path: P) -> Result<usize> {
	let mut writer = BufWriter::new(File::create(path)?);
	let written = serialize(trie, &mut writer)?;
	writer.flush()?;
	Ok(written)
}

/// Loads a trie from a model file, using a binary cache when available.
///
/// If a sibling `.bin` file exists it is deserialized directly with
/// `postcard` for fast loading; otherwise the text format is parsed and
/// the binary cache is written for next time.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<FrequencyTrie> {
	let binary_path = build_output_path(&path, "bin")?;
	if binary_path.exists() {
		let bytes = fs::read(binary_path)?;
		return Ok(postcard::from_bytes(&bytes)?);
	}

	let trie = deserialize(BufReader::new(File::open(path)?))?;
	let bytes = postcard::to_stdvec(&trie)?;
	fs::write(binary_path, bytes)?;
	Ok(trie)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::builder::TrieBuilder;
	use crate::model::expression::{ExpressionSource, Tokenization};

	fn scenario_trie() -> FrequencyTrie {
		let mut source = ExpressionSource::new(Tokenization::Characters);
		let mut builder = TrieBuilder::new(1);
		builder.add(source.parse_line("3 ab").unwrap());
		builder.add(source.parse_line("1 ac").unwrap());
		builder.build()
	}

	#[test]
	fn scenario_serializes_to_five_lines() {
		let trie = scenario_trie();
		let mut buffer = Vec::new();
		let written = serialize(&trie, &mut buffer).unwrap();
		assert_eq!(written, 5);
		assert_eq!(String::from_utf8(buffer).unwrap().lines().count(), 5);
	}

	#[test]
	fn round_trip_is_exact() {
		let trie = scenario_trie();
		let mut buffer = Vec::new();
		serialize(&trie, &mut buffer).unwrap();

		let reloaded = deserialize(buffer.as_slice()).unwrap();
		assert_eq!(reloaded, trie);
		assert_eq!(reloaded.depth(), 1);
	}

	#[test]
	fn fractional_weights_round_trip_exactly() {
		let mut trie = FrequencyTrie::new(1);
		trie.increment(&[Token::text("a")], Token::text("b"), 0.1 + 0.2);
		trie.increment(&[Token::text("a")], Token::Sentinel, 1e-3);

		let mut buffer = Vec::new();
		serialize(&trie, &mut buffer).unwrap();
		assert_eq!(deserialize(buffer.as_slice()).unwrap(), trie);
	}

	#[test]
	fn depth_is_inferred_from_the_first_line() {
		let data = "##a#1\n#a#b#2\na#b##3\n";
		let trie = deserialize(data.as_bytes()).unwrap();
		assert_eq!(trie.depth(), 2);
		assert_eq!(trie.get(&[Token::Sentinel, Token::Sentinel], &Token::text("a")), 1.0);
		assert_eq!(trie.get(&[Token::text("a"), Token::text("b")], &Token::Sentinel), 3.0);
	}

	#[test]
	fn inconsistent_field_count_is_fatal() {
		let data = "#a#1\n#a#b#2\n";
		match deserialize(data.as_bytes()) {
			Err(OnomaError::MalformedLine { line: 2, expected: 3, found: 4 }) => (),
			other => panic!("expected MalformedLine, got {:?}", other),
		}
	}

	#[test]
	fn duplicate_paths_are_fatal() {
		let data = "a#b#1\na#b#2\n";
		match deserialize(data.as_bytes()) {
			Err(OnomaError::DuplicatePath { line: 2 }) => (),
			other => panic!("expected DuplicatePath, got {:?}", other),
		}
	}

	#[test]
	fn unparsable_weight_is_fatal() {
		let data = "a#b#heavy\n";
		assert!(matches!(
			deserialize(data.as_bytes()),
			Err(OnomaError::InvalidWeight { line: 1, .. })
		));
	}

	#[test]
	fn empty_input_is_fatal() {
		assert!(matches!(deserialize(&b""[..]), Err(OnomaError::EmptyModel)));
	}

	#[test]
	fn load_model_builds_then_reuses_the_binary_cache() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("letters.occ");
		let trie = scenario_trie();
		save_model(&trie, &path).unwrap();

		// First load parses the text file and drops a .bin next to it.
		let first = load_model(&path).unwrap();
		assert_eq!(first, trie);
		assert!(dir.path().join("letters.bin").exists());

		// Second load goes through the cache.
		let second = load_model(&path).unwrap();
		assert_eq!(second, trie);
	}
}
