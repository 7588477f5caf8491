//! Utility functions and constants for the RESP wire format.

use crate::error::ProtocolError;

/// CRLF line ending
pub const CRLF: &[u8] = b"\r\n";

/// Reply type prefixes
pub const STATUS: u8 = b'+';
pub const ERROR: u8 = b'-';
pub const INTEGER: u8 = b':';
pub const BULK: u8 = b'$';
pub const MULTI_BULK: u8 = b'*';

/// Find the first CRLF-terminated line without consuming anything.
///
/// Returns the line (without CRLF) and the total number of bytes it occupies
/// including the terminator, or `None` when no terminator is buffered yet.
#[inline]
pub fn peek_line(buf: &[u8]) -> Option<(&[u8], usize)> {
	memchr::memmem::find(buf, CRLF).map(|pos| (&buf[..pos], pos + 2))
}

/// Parse a base-10, optionally signed integer from a byte slice.
///
/// Fractional and exponent forms are malformed input, not integers.
#[inline]
pub fn parse_integer(buf: &[u8]) -> Result<i64, ProtocolError> {
	let s = std::str::from_utf8(buf)
		.map_err(|e| ProtocolError::InvalidInteger(e.to_string()))?;
	s.parse::<i64>()
		.map_err(|e| ProtocolError::InvalidInteger(e.to_string()))
}
