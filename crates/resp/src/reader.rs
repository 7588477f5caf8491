//! Incremental decoder for RESP reply streams.

use bytes::Buf;
use bytes::Bytes;
use bytes::BytesMut;

use crate::error::ProtocolError;
use crate::types::Reply;
use crate::types::ReplyArray;
use crate::utils::*;

/// Result of a decode attempt.
#[derive(Debug)]
pub enum ReadResult {
	/// A complete reply was decoded.
	Complete(Reply),
	/// The buffer does not hold a complete reply yet; feed more bytes first.
	Incomplete,
	/// The stream is desynchronized; the reader must be discarded.
	Error(ProtocolError),
}

/// Maximum supported nesting depth for multi bulk replies.
pub const MAX_DEPTH: usize = 7;

/// Arena handle of an in-progress reply node.
type NodeId = usize;

/// One pending value in the decode of a single top-level reply: the slot it
/// fills in its parent array and how deeply it is nested. The root task has
/// no parent. Tasks live only until their value completes.
#[derive(Debug, Clone, Copy)]
struct ParseTask {
	parent: Option<NodeId>,
	idx: usize,
	depth: usize,
}

/// Nodes are addressed by index so parent/child linkage never needs a
/// back-pointer; a finished reply is detached by walking the indices.
#[derive(Debug)]
enum Node {
	Value(Reply),
	Array {
		slots: Vec<Option<NodeId>>,
		filled: usize,
		contains_error: bool,
	},
}

enum Step {
	Done,
	Blocked,
}

/// A stateful incremental reply decoder.
///
/// [`feed`](Self::feed) appends raw socket bytes; [`next_reply`](Self::next_reply)
/// consumes them and yields one top-level reply at a time. Partial input is
/// never evicted: an [`ReadResult::Incomplete`] attempt resumes from exactly
/// where parsing stopped once more bytes arrive. The reader performs no I/O
/// and never decides error fatality; it only classifies.
pub struct ReplyReader {
	buf: BytesMut,
	arena: Vec<Node>,
	tasks: Vec<ParseTask>,
	root: Option<NodeId>,
	poisoned: Option<ProtocolError>,
}

impl Default for ReplyReader {
	fn default() -> Self {
		Self::new()
	}
}

impl ReplyReader {
	pub fn new() -> Self {
		Self {
			buf: BytesMut::new(),
			arena: Vec::new(),
			tasks: Vec::new(),
			root: None,
			poisoned: None,
		}
	}

	/// Append raw bytes to the internal buffer. Side effect only.
	pub fn feed(&mut self, bytes: &[u8]) {
		self.buf.extend_from_slice(bytes);
	}

	/// Try to decode the next top-level reply from the buffered bytes.
	///
	/// Callable repeatedly. After a [`ReadResult::Error`] the reader is
	/// permanently unusable and keeps returning the same error.
	pub fn next_reply(&mut self) -> ReadResult {
		if let Some(err) = &self.poisoned {
			return ReadResult::Error(err.clone());
		}

		if self.tasks.is_empty() {
			self.tasks.push(ParseTask {
				parent: None,
				idx: 0,
				depth: 0,
			});
		}

		while let Some(task) = self.tasks.last().copied() {
			match self.parse_step(task) {
				Ok(Step::Done) => {}
				Ok(Step::Blocked) => return ReadResult::Incomplete,
				Err(err) => {
					self.poison(err.clone());
					return ReadResult::Error(err);
				}
			}
		}

		// The task stack drained, so the root value is complete.
		match self.root.take() {
			Some(id) => {
				let reply = self.detach(id);
				self.arena.clear();
				ReadResult::Complete(reply)
			}
			None => ReadResult::Incomplete,
		}
	}

	/// Decode one token for the topmost task. Blocks (without consuming
	/// anything) whenever the buffer lacks the token's full byte count.
	fn parse_step(&mut self, task: ParseTask) -> Result<Step, ProtocolError> {
		let Some(&prefix) = self.buf.first() else {
			return Ok(Step::Blocked);
		};

		match prefix {
			STATUS => self.parse_line(task, false),
			ERROR => self.parse_line(task, true),
			INTEGER => self.parse_integer_reply(task),
			BULK => self.parse_bulk(task),
			MULTI_BULK => self.parse_multi_bulk(task),
			other => Err(ProtocolError::InvalidTypePrefix(other as char)),
		}
	}

	/// Status (`+`) and error (`-`) replies: a single line up to CRLF.
	fn parse_line(&mut self, task: ParseTask, is_error: bool) -> Result<Step, ProtocolError> {
		let Some((line, consumed)) = peek_line(&self.buf[1..]) else {
			return Ok(Step::Blocked);
		};

		let payload = Bytes::copy_from_slice(line);
		self.buf.advance(1 + consumed);
		let reply = if is_error {
			Reply::Error(payload)
		} else {
			Reply::String(payload)
		};
		self.place(task, reply);
		Ok(Step::Done)
	}

	/// Integer reply: `:1000\r\n`
	fn parse_integer_reply(&mut self, task: ParseTask) -> Result<Step, ProtocolError> {
		let Some((line, consumed)) = peek_line(&self.buf[1..]) else {
			return Ok(Step::Blocked);
		};

		let value = parse_integer(line)?;
		self.buf.advance(1 + consumed);
		self.place(task, Reply::Integer(value));
		Ok(Step::Done)
	}

	/// Bulk string: `$6\r\nfoobar\r\n`, or `$-1\r\n` for nil.
	fn parse_bulk(&mut self, task: ParseTask) -> Result<Step, ProtocolError> {
		let Some((line, len_consumed)) = peek_line(&self.buf[1..]) else {
			return Ok(Step::Blocked);
		};

		let length = parse_integer(line)?;
		if length == -1 {
			self.buf.advance(1 + len_consumed);
			self.place(task, Reply::Nil);
			return Ok(Step::Done);
		}
		if length < -1 {
			return Err(ProtocolError::InvalidBulkLength(length));
		}

		let length = length as usize;
		if self.buf.len() < 1 + len_consumed + length + 2 {
			return Ok(Step::Blocked);
		}

		self.buf.advance(1 + len_consumed);
		let payload = self.buf.split_to(length).freeze();
		if &self.buf[..2] != CRLF {
			return Err(ProtocolError::MissingTerminator);
		}
		self.buf.advance(2);

		self.place(task, Reply::String(payload));
		Ok(Step::Done)
	}

	/// Multi bulk: `*<n>\r\n` followed by n nested replies, or `*-1\r\n`
	/// for a nil array. The array node is allocated with its slot count
	/// fixed up front and attached to its parent immediately; one child
	/// task per slot is pushed so the elements decode depth-first.
	fn parse_multi_bulk(&mut self, task: ParseTask) -> Result<Step, ProtocolError> {
		let Some((line, len_consumed)) = peek_line(&self.buf[1..]) else {
			return Ok(Step::Blocked);
		};

		let length = parse_integer(line)?;
		if length == -1 {
			self.buf.advance(1 + len_consumed);
			self.place(task, Reply::Nil);
			return Ok(Step::Done);
		}
		if length < -1 {
			return Err(ProtocolError::InvalidMultiBulkLength(length));
		}
		if task.depth >= MAX_DEPTH {
			return Err(ProtocolError::NestingTooDeep(MAX_DEPTH));
		}

		let length = length as usize;
		self.buf.advance(1 + len_consumed);

		let id = self.arena.len();
		self.arena.push(Node::Array {
			slots: vec![None; length],
			filled: 0,
			contains_error: false,
		});
		self.attach(task, id, false);
		self.tasks.pop();

		// Reverse order, so the task for slot 0 is decoded first.
		for idx in (0..length).rev() {
			self.tasks.push(ParseTask {
				parent: Some(id),
				idx,
				depth: task.depth + 1,
			});
		}
		Ok(Step::Done)
	}

	/// Store a terminal value for `task` and retire the task.
	fn place(&mut self, task: ParseTask, reply: Reply) {
		let is_error = reply.is_error();
		let id = self.arena.len();
		self.arena.push(Node::Value(reply));
		self.attach(task, id, is_error);
		self.tasks.pop();
	}

	/// Link a node into its parent slot, or make it the root. An error
	/// child flags its immediate parent; the flag never cascades further.
	fn attach(&mut self, task: ParseTask, id: NodeId, is_error: bool) {
		match task.parent {
			Some(parent) => {
				if let Node::Array {
					slots,
					filled,
					contains_error,
				} = &mut self.arena[parent]
				{
					slots[task.idx] = Some(id);
					*filled += 1;
					if is_error {
						*contains_error = true;
					}
				}
			}
			None => self.root = Some(id),
		}
	}

	/// Convert the arena subtree rooted at `id` into an owned reply. The
	/// result holds no references into the reader.
	fn detach(&mut self, id: NodeId) -> Reply {
		match std::mem::replace(&mut self.arena[id], Node::Value(Reply::Nil)) {
			Node::Value(reply) => reply,
			Node::Array {
				slots,
				filled,
				contains_error,
			} => {
				debug_assert_eq!(filled, slots.len());
				let mut items = Vec::with_capacity(slots.len());
				for child in slots.into_iter().flatten() {
					items.push(self.detach(child));
				}
				Reply::Array(ReplyArray::with_flag(items, contains_error))
			}
		}
	}

	/// A protocol error leaves the buffer desynchronized; drop the whole
	/// arena and remember the error for every later call.
	fn poison(&mut self, err: ProtocolError) {
		self.buf.clear();
		self.arena.clear();
		self.tasks.clear();
		self.root = None;
		self.poisoned = Some(err);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn complete(input: &[u8]) -> Reply {
		let mut reader = ReplyReader::new();
		reader.feed(input);
		match reader.next_reply() {
			ReadResult::Complete(reply) => reply,
			other => panic!("expected Complete, got {:?}", other),
		}
	}

	#[test]
	fn test_incomplete_on_empty_buffer() {
		let mut reader = ReplyReader::new();
		assert!(matches!(reader.next_reply(), ReadResult::Incomplete));
	}

	#[test]
	fn test_status_reply() {
		assert_eq!(complete(b"+OK\r\n"), Reply::string("OK"));
	}

	#[test]
	fn test_error_reply() {
		assert_eq!(complete(b"-ERR unknown\r\n"), Reply::error("ERR unknown"));
	}

	#[test]
	fn test_integer_reply() {
		assert_eq!(complete(b":1000\r\n"), Reply::Integer(1000));
	}

	#[test]
	fn test_bulk_reply() {
		assert_eq!(complete(b"$6\r\nfoobar\r\n"), Reply::string("foobar"));
	}

	#[test]
	fn test_nil_bulk_reply() {
		assert_eq!(complete(b"$-1\r\n"), Reply::Nil);
	}

	#[test]
	fn test_multi_bulk_reply() {
		let reply = complete(b"*2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n");
		assert_eq!(
			reply,
			Reply::array(vec![Reply::string("foo"), Reply::string("bar")])
		);
	}

	#[test]
	fn test_partial_token_is_not_consumed() {
		let mut reader = ReplyReader::new();
		reader.feed(b"+HEL");
		assert!(matches!(reader.next_reply(), ReadResult::Incomplete));

		reader.feed(b"LO\r\n");
		match reader.next_reply() {
			ReadResult::Complete(reply) => assert_eq!(reply, Reply::string("HELLO")),
			other => panic!("expected Complete, got {:?}", other),
		}
	}

	#[test]
	fn test_invalid_type_prefix() {
		let mut reader = ReplyReader::new();
		reader.feed(b"!oops\r\n");
		match reader.next_reply() {
			ReadResult::Error(ProtocolError::InvalidTypePrefix('!')) => {}
			other => panic!("expected InvalidTypePrefix, got {:?}", other),
		}
	}

	#[test]
	fn test_poisoned_reader_keeps_failing() {
		let mut reader = ReplyReader::new();
		reader.feed(b"*2\r\n$-2\r\n");
		assert!(matches!(reader.next_reply(), ReadResult::Error(_)));

		// Even with valid bytes fed afterwards, the reader stays dead.
		reader.feed(b"+OK\r\n");
		match reader.next_reply() {
			ReadResult::Error(ProtocolError::InvalidBulkLength(-2)) => {}
			other => panic!("expected the original error again, got {:?}", other),
		}
	}
}
