//! # Carmine - a RESP protocol client engine
//!
//! One [`Connection`] owns one socket, one outbound buffer and one reply
//! decoder. Commands are queued with [`Connection::write`] (or the
//! [`Connection::command`] convenience) and flushed lazily by
//! [`Connection::read`], so several commands can be pipelined and sent as a
//! single burst. Replies come back in the exact order the commands were
//! written.
//!
//! ## Example
//!
//! ```no_run
//! use carmine::Connection;
//!
//! # async fn run() -> Result<(), carmine::ConnectionError> {
//! let mut conn = Connection::new();
//! conn.connect("127.0.0.1", 6379, None).await?;
//! conn.command(&["PING"])?;
//! let reply = conn.read().await?;
//! assert_eq!(reply.as_str(), Some("PONG"));
//! # Ok(())
//! # }
//! ```

mod connection;
mod error;

pub use connection::Connection;
pub use error::ConnectionError;

// Protocol surface, re-exported so callers need only this crate.
pub use resp::ProtocolError;
pub use resp::Reply;
pub use resp::ReplyArray;
pub use resp::ReplyReader;
pub use resp::encode_command;
