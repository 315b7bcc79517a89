use thiserror::Error;

/// Coarse classification of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// Missing delimiter or terminator, truncated byte string, bad integer literal.
	MalformedInput,
	InvalidLeadingByte,
	IntegerOutOfRange,
	InvalidLength,
	NonStringKey,
	DuplicateKey,
}

/// A parse failure and the byte offset where it was detected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BencodeError {
	#[error("expecting a value but end of input reached at {offset}")]
	UnexpectedEnd { offset: usize },

	#[error("invalid value type {byte:#04x} at {offset}")]
	InvalidLeadingByte { byte: u8, offset: usize },

	#[error("no ending mark found for integer at {offset}")]
	UnterminatedInteger { offset: usize },

	#[error("expecting integer but received '{literal}' at {offset}")]
	MalformedInteger { literal: String, offset: usize },

	#[error("integer value out of range: {literal} at {offset}")]
	IntegerOutOfRange { literal: String, offset: usize },

	#[error("cannot find ':' mark for string at {offset}")]
	MissingLengthDelimiter { offset: usize },

	#[error("cannot parse string length '{literal}' at {offset}")]
	InvalidLength { literal: String, offset: usize },

	#[error("string at {offset} ends prematurely, expecting {expected} bytes, has {available}")]
	TruncatedString {
		offset: usize,
		expected: usize,
		available: usize,
	},

	#[error("list at {offset} ends prematurely")]
	UnterminatedList { offset: usize },

	#[error("dictionary at {offset} ends prematurely")]
	UnterminatedDictionary { offset: usize },

	#[error("dictionary requires a string-type key, found {byte:#04x} at {offset}")]
	NonStringKey { byte: u8, offset: usize },

	#[error("duplicated key '{key}' in dictionary at {offset}")]
	DuplicateKey { key: String, offset: usize },

	#[error("nesting too deep at {offset}")]
	NestingTooDeep { offset: usize },

	#[error("trailing data after value at {offset}")]
	TrailingData { offset: usize },
}

impl BencodeError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			BencodeError::InvalidLeadingByte { .. } => ErrorKind::InvalidLeadingByte,
			BencodeError::IntegerOutOfRange { .. } => ErrorKind::IntegerOutOfRange,
			BencodeError::InvalidLength { .. } => ErrorKind::InvalidLength,
			BencodeError::NonStringKey { .. } => ErrorKind::NonStringKey,
			BencodeError::DuplicateKey { .. } => ErrorKind::DuplicateKey,
			BencodeError::UnexpectedEnd { .. }
			| BencodeError::UnterminatedInteger { .. }
			| BencodeError::MalformedInteger { .. }
			| BencodeError::MissingLengthDelimiter { .. }
			| BencodeError::TruncatedString { .. }
			| BencodeError::UnterminatedList { .. }
			| BencodeError::UnterminatedDictionary { .. }
			| BencodeError::NestingTooDeep { .. }
			| BencodeError::TrailingData { .. } => ErrorKind::MalformedInput,
		}
	}

	/// Byte offset into the input where the problem was detected.
	pub fn offset(&self) -> usize {
		match *self {
			BencodeError::UnexpectedEnd { offset }
			| BencodeError::InvalidLeadingByte { offset, .. }
			| BencodeError::UnterminatedInteger { offset }
			| BencodeError::MalformedInteger { offset, .. }
			| BencodeError::IntegerOutOfRange { offset, .. }
			| BencodeError::MissingLengthDelimiter { offset }
			| BencodeError::InvalidLength { offset, .. }
			| BencodeError::TruncatedString { offset, .. }
			| BencodeError::UnterminatedList { offset }
			| BencodeError::UnterminatedDictionary { offset }
			| BencodeError::NonStringKey { offset, .. }
			| BencodeError::DuplicateKey { offset, .. }
			| BencodeError::NestingTooDeep { offset }
			| BencodeError::TrailingData { offset } => offset,
		}
	}
}
