//! Reply values produced by the decoder.

use bytes::Bytes;

/// A single decoded reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
	/// Null reply: `$-1\r\n` or `*-1\r\n`
	Nil,

	/// Integer reply: `:1000\r\n`
	Integer(i64),

	/// Status reply `+OK\r\n` or bulk string `$6\r\nfoobar\r\n`; both carry
	/// an uninterpreted byte string
	String(Bytes),

	/// Error reply: `-ERR message\r\n`
	Error(Bytes),

	/// Multi bulk reply: `*2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n`
	Array(ReplyArray),
}

/// A multi bulk reply.
///
/// The slot count is fixed by the `*<n>` wire header; slots are filled by
/// index as children decode. When one of the direct children is an error
/// reply the array is flagged, so callers can detect "this bulk reply
/// contains an error" without walking the tree. The flag does not cascade
/// past the immediate parent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReplyArray {
	items: Vec<Reply>,
	contains_error: bool,
}

impl Reply {
	/// Check if the reply is nil
	pub fn is_nil(&self) -> bool {
		matches!(self, Reply::Nil)
	}

	/// Check if the reply is an error reply
	pub fn is_error(&self) -> bool {
		matches!(self, Reply::Error(_))
	}

	/// Check if the reply is an error or an array holding one
	pub fn contains_error(&self) -> bool {
		match self {
			Reply::Error(_) => true,
			Reply::Array(arr) => arr.contains_error(),
			_ => false,
		}
	}

	/// Try to view the payload as a string slice
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Reply::String(s) | Reply::Error(s) => std::str::from_utf8(s).ok(),
			_ => None,
		}
	}

	/// Try to view the payload bytes
	pub fn as_bytes(&self) -> Option<&Bytes> {
		match self {
			Reply::String(s) | Reply::Error(s) => Some(s),
			_ => None,
		}
	}

	/// Try to convert to an integer
	pub fn as_integer(&self) -> Option<i64> {
		match self {
			Reply::Integer(i) => Some(*i),
			_ => None,
		}
	}

	/// Try to view as an array
	pub fn as_array(&self) -> Option<&ReplyArray> {
		match self {
			Reply::Array(arr) => Some(arr),
			_ => None,
		}
	}

	/// Try to consume into the array elements
	pub fn into_vec(self) -> Option<Vec<Reply>> {
		match self {
			Reply::Array(arr) => Some(arr.into_items()),
			_ => None,
		}
	}

	// Convenience constructors

	/// Create a string reply
	pub fn string(s: impl Into<Bytes>) -> Self {
		Reply::String(s.into())
	}

	/// Create an error reply
	pub fn error(e: impl Into<Bytes>) -> Self {
		Reply::Error(e.into())
	}

	/// Create an integer reply
	pub fn integer(i: i64) -> Self {
		Reply::Integer(i)
	}

	/// Create an array reply from an iterator of elements
	pub fn array(items: impl IntoIterator<Item = Reply>) -> Self {
		Reply::Array(items.into_iter().collect::<Vec<_>>().into())
	}
}

impl ReplyArray {
	/// Number of slots declared by the wire header.
	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Whether one of the direct children is an error reply.
	pub fn contains_error(&self) -> bool {
		self.contains_error
	}

	pub fn items(&self) -> &[Reply] {
		&self.items
	}

	pub fn get(&self, idx: usize) -> Option<&Reply> {
		self.items.get(idx)
	}

	pub fn into_items(self) -> Vec<Reply> {
		self.items
	}

	/// Assemble an array whose error flag was tracked during decoding.
	pub(crate) fn with_flag(items: Vec<Reply>, contains_error: bool) -> Self {
		Self {
			items,
			contains_error,
		}
	}
}

impl From<Vec<Reply>> for ReplyArray {
	fn from(items: Vec<Reply>) -> Self {
		let contains_error = items.iter().any(Reply::is_error);
		Self {
			items,
			contains_error,
		}
	}
}

impl From<&str> for Reply {
	fn from(s: &str) -> Self {
		Reply::String(Bytes::copy_from_slice(s.as_bytes()))
	}
}

impl From<i64> for Reply {
	fn from(i: i64) -> Self {
		Reply::Integer(i)
	}
}

impl<T: Into<Reply>> From<Option<T>> for Reply {
	fn from(o: Option<T>) -> Self {
		match o {
			Some(v) => v.into(),
			None => Reply::Nil,
		}
	}
}
