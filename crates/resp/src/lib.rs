//! # RESP - reply decoding and command encoding
//!
//! The client-side half of the Redis Serialization Protocol: an incremental
//! [`ReplyReader`] that reconstructs nested reply values from arbitrary-sized
//! byte chunks, and an encoder that turns an argument list into a command
//! frame.
//!
//! The reader performs no I/O. Bytes go in through [`ReplyReader::feed`];
//! complete values come out of [`ReplyReader::next_reply`].
//!
//! ## Example
//!
//! ```rust
//! use resp::ReadResult;
//! use resp::Reply;
//! use resp::ReplyReader;
//!
//! let mut reader = ReplyReader::new();
//! reader.feed(b"+OK\r\n");
//! match reader.next_reply() {
//! 	ReadResult::Complete(reply) => assert_eq!(reply.as_str(), Some("OK")),
//! 	other => panic!("expected a complete reply, got {:?}", other),
//! }
//! ```

mod encode;
mod error;
mod reader;
mod types;
mod utils;

pub use encode::ReplyEncoder;
pub use encode::encode_command;
pub use error::ProtocolError;
pub use reader::MAX_DEPTH;
pub use reader::ReadResult;
pub use reader::ReplyReader;
pub use types::Reply;
pub use types::ReplyArray;
