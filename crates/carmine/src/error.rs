//! Error taxonomy for connection operations.

use std::io;

use resp::ProtocolError;
use thiserror::Error;

/// Errors surfaced by [`Connection`](crate::Connection) operations.
#[derive(Error, Debug)]
pub enum ConnectionError {
	/// Syscall-level failure: connect refused, send/recv error
	#[error("I/O error: {0}")]
	Io(#[from] io::Error),

	/// A readiness wait exceeded its budget. The connection stays usable;
	/// the caller may retry with a longer budget.
	#[error("Operation timed out")]
	Timeout,

	/// The peer closed the connection mid-stream
	#[error("Server closed the connection")]
	Eof,

	/// Malformed reply bytes; the stream is desynchronized
	#[error(transparent)]
	Protocol(#[from] ProtocolError),

	/// Caller bug: invalid argument or operation in the wrong state
	#[error("{0}")]
	Usage(&'static str),
}

impl ConnectionError {
	/// Whether this error tears down the connection. The driver is the
	/// only place that decides fatality; the decoder just classifies.
	pub fn is_fatal(&self) -> bool {
		matches!(self, Self::Io(_) | Self::Eof | Self::Protocol(_))
	}
}
