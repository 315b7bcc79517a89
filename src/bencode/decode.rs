use super::bvalue::{BValue, Dictionary};
use super::error::BencodeError;

/// Lists and dictionaries nested deeper than this are rejected.
pub const MAX_DEPTH: usize = 512;

/// Parses one value starting at `*cursor` and leaves the cursor just past it.
///
/// On error the cursor position is unspecified and the attempt must be discarded.
pub fn parse_at(input: &[u8], cursor: &mut usize) -> Result<BValue, BencodeError> {
	parse_value(input, cursor, 0)
}

/// Parses the value at the start of `input`. Bytes after it are ignored.
pub fn parse(input: &[u8]) -> Result<BValue, BencodeError> {
	let mut cursor = 0;
	parse_at(input, &mut cursor)
}

/// Parses the value at the start of `input` and reports how many bytes it used.
pub fn decode_bencode(input: &[u8]) -> Result<(usize, BValue), BencodeError> {
	let mut cursor = 0;
	let value = parse_at(input, &mut cursor)?;
	Ok((cursor, value))
}

/// Like [`decode_bencode`], but the value must span the whole buffer.
pub fn decode_all(input: &[u8]) -> Result<BValue, BencodeError> {
	let (consumed, value) = decode_bencode(input)?;
	if consumed != input.len() {
		return Err(BencodeError::TrailingData { offset: consumed });
	}
	Ok(value)
}

fn parse_value(input: &[u8], pos: &mut usize, depth: usize) -> Result<BValue, BencodeError> {
	match input.get(*pos) {
		None => Err(BencodeError::UnexpectedEnd { offset: *pos }),
		Some(b'i') => parse_integer(input, pos),
		Some(b'l') => parse_list(input, pos, depth),
		Some(b'd') => parse_dict(input, pos, depth),
		Some(b) if b.is_ascii_digit() => parse_string(input, pos).map(BValue::ByteString),
		Some(&byte) => Err(BencodeError::InvalidLeadingByte { byte, offset: *pos }),
	}
}

/// `i<digits>e`, with an optional leading '-'.
fn parse_integer(input: &[u8], pos: &mut usize) -> Result<BValue, BencodeError> {
	let start = *pos;
	let end = find_byte(input, start + 1, b'e')
		.ok_or(BencodeError::UnterminatedInteger { offset: start })?;
	let literal = &input[start + 1..end];

	// Leading zeros and "-0" have no place in a canonical integer
	if !is_integer_literal(literal) {
		return Err(BencodeError::MalformedInteger {
			literal: lossy(literal),
			offset: start,
		});
	}

	let text = std::str::from_utf8(literal).map_err(|_| BencodeError::MalformedInteger {
		literal: lossy(literal),
		offset: start,
	})?;
	let value = text
		.parse::<i64>()
		.map_err(|_| BencodeError::IntegerOutOfRange {
			literal: text.to_string(),
			offset: start,
		})?;

	// skip past 'e'
	*pos = end + 1;
	Ok(BValue::Integer(value))
}

fn is_integer_literal(literal: &[u8]) -> bool {
	let digits = literal.strip_prefix(b"-").unwrap_or(literal);
	if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
		return false;
	}
	match digits[0] {
		b'0' => digits.len() == 1 && digits.len() == literal.len(),
		_ => true,
	}
}

/// `<length>:<bytes>`
fn parse_string(input: &[u8], pos: &mut usize) -> Result<Vec<u8>, BencodeError> {
	let start = *pos;
	let colon = find_byte(input, start, b':')
		.ok_or(BencodeError::MissingLengthDelimiter { offset: start })?;
	let literal = &input[start..colon];
	let length = parse_length(literal).ok_or_else(|| BencodeError::InvalidLength {
		literal: lossy(literal),
		offset: start,
	})?;

	let data_start = colon + 1;
	let available = input.len() - data_start;
	if length > available {
		return Err(BencodeError::TruncatedString {
			offset: start,
			expected: length,
			available,
		});
	}

	*pos = data_start + length;
	Ok(input[data_start..*pos].to_vec())
}

fn parse_length(literal: &[u8]) -> Option<usize> {
	if literal.is_empty() || !literal.iter().all(u8::is_ascii_digit) {
		return None;
	}
	if literal.len() > 1 && literal[0] == b'0' {
		return None;
	}
	std::str::from_utf8(literal).ok()?.parse().ok()
}

/// `l<values>e`
fn parse_list(input: &[u8], pos: &mut usize, depth: usize) -> Result<BValue, BencodeError> {
	let start = *pos;
	if depth >= MAX_DEPTH {
		return Err(BencodeError::NestingTooDeep { offset: start });
	}

	*pos += 1; // skip 'l'
	let mut items = Vec::new();
	loop {
		match input.get(*pos) {
			None => return Err(BencodeError::UnterminatedList { offset: start }),
			Some(b'e') => {
				*pos += 1;
				return Ok(BValue::List(items));
			}
			Some(_) => items.push(parse_value(input, pos, depth + 1)?),
		}
	}
}

/// `d<key><value>...e`. Keys are byte strings and may not repeat.
fn parse_dict(input: &[u8], pos: &mut usize, depth: usize) -> Result<BValue, BencodeError> {
	let start = *pos;
	if depth >= MAX_DEPTH {
		return Err(BencodeError::NestingTooDeep { offset: start });
	}

	*pos += 1; // skip 'd'
	let mut map = Dictionary::new();
	loop {
		let key_offset = *pos;
		match input.get(*pos) {
			None => return Err(BencodeError::UnterminatedDictionary { offset: start }),
			Some(b'e') => {
				*pos += 1;
				return Ok(BValue::Dict(map));
			}
			Some(b) if b.is_ascii_digit() => {
				let key = parse_string(input, pos)?;
				if *pos >= input.len() {
					return Err(BencodeError::UnterminatedDictionary { offset: start });
				}
				let value = parse_value(input, pos, depth + 1)?;

				if map.contains_key(key.as_slice()) {
					return Err(BencodeError::DuplicateKey {
						key: lossy(&key),
						offset: key_offset,
					});
				}
				map.insert(key, value);
			}
			Some(&byte) => {
				return Err(BencodeError::NonStringKey {
					byte,
					offset: key_offset,
				})
			}
		}
	}
}

fn find_byte(input: &[u8], from: usize, needle: u8) -> Option<usize> {
	input
		.get(from..)?
		.iter()
		.position(|&b| b == needle)
		.map(|i| from + i)
}

fn lossy(bytes: &[u8]) -> String {
	String::from_utf8_lossy(bytes).into_owned()
}
