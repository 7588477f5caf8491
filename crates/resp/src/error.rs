//! Error type for RESP decoding.

use thiserror::Error;

/// Errors that can occur while decoding a reply stream.
///
/// Any of these means the stream is desynchronized: the reader that produced
/// the error keeps returning it and must be discarded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
	/// Unknown reply type prefix
	#[error("Protocol error, got {0:?} as reply type byte")]
	InvalidTypePrefix(char),

	/// Malformed integer payload or length line
	#[error("Invalid integer: {0}")]
	InvalidInteger(String),

	/// Bulk string length below -1
	#[error("Invalid bulk string length: {0}")]
	InvalidBulkLength(i64),

	/// Multi bulk length below -1
	#[error("Invalid multi bulk length: {0}")]
	InvalidMultiBulkLength(i64),

	/// Bulk string payload not terminated by CRLF
	#[error("Expected CRLF after bulk string payload")]
	MissingTerminator,

	/// Reply nesting beyond the supported depth
	#[error("No support for multi bulk replies nested deeper than {0} levels")]
	NestingTooDeep(usize),
}
