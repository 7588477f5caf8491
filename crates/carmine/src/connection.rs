//! Non-blocking connection driver.

use std::io;
#[cfg(unix)]
use std::path::Path;
use std::time::Duration;
use std::time::Instant;

use bytes::Buf;
use bytes::BytesMut;
use log::debug;
use log::trace;
use resp::ReadResult;
use resp::Reply;
use resp::ReplyReader;
use tokio::io::Interest;
use tokio::net::TcpStream;
#[cfg(unix)]
use tokio::net::UnixStream;

use crate::error::ConnectionError;

/// Receive chunk size for one non-blocking read.
const RECV_CHUNK: usize = 4096;

enum Stream {
	Tcp(TcpStream),
	#[cfg(unix)]
	Unix(UnixStream),
}

impl Stream {
	async fn ready(&self, interest: Interest) -> io::Result<()> {
		match self {
			Stream::Tcp(s) => s.ready(interest).await.map(|_| ()),
			#[cfg(unix)]
			Stream::Unix(s) => s.ready(interest).await.map(|_| ()),
		}
	}

	fn try_read(&self, buf: &mut [u8]) -> io::Result<usize> {
		match self {
			Stream::Tcp(s) => s.try_read(buf),
			#[cfg(unix)]
			Stream::Unix(s) => s.try_read(buf),
		}
	}

	fn try_write(&self, buf: &[u8]) -> io::Result<usize> {
		match self {
			Stream::Tcp(s) => s.try_write(buf),
			#[cfg(unix)]
			Stream::Unix(s) => s.try_write(buf),
		}
	}
}

/// A single RESP connection: one socket, one outbound buffer, one reply
/// decoder.
///
/// [`write`](Self::write) only queues bytes; transmission is deferred to the
/// next [`read`](Self::read), so several commands flush as one burst and
/// their replies come back in write order. All methods take `&mut self`:
/// the driver supports one outstanding operation at a time and relies on
/// external serialization for anything more.
///
/// Timeout expiry is the only non-fatal I/O failure. Everything else drops
/// the socket and the decoder together, because a decoder with partially
/// parsed state must never resume against a new socket.
pub struct Connection {
	stream: Option<Stream>,
	timeout: Option<Duration>,
	wbuf: BytesMut,
	reader: ReplyReader,
}

impl Default for Connection {
	fn default() -> Self {
		Self::new()
	}
}

impl Connection {
	/// Create a connection in the disconnected state with no default
	/// timeout.
	pub fn new() -> Self {
		Self {
			stream: None,
			timeout: None,
			wbuf: BytesMut::new(),
			reader: ReplyReader::new(),
		}
	}

	pub fn connected(&self) -> bool {
		self.stream.is_some()
	}

	/// Open a TCP connection to `host:port`.
	///
	/// The wait for connect completion is bounded by `connect_timeout` if
	/// given, else the per-connection default, else unbounded. On any
	/// failure the connection remains disconnected.
	pub async fn connect(
		&mut self,
		host: &str,
		port: u16,
		connect_timeout: Option<Duration>,
	) -> Result<(), ConnectionError> {
		let budget = self.effective_timeout(connect_timeout)?;
		self.release();

		debug!("connecting to {}:{}", host, port);
		let stream = bounded(budget, TcpStream::connect((host, port))).await?;
		stream.set_nodelay(true)?;
		self.install(Stream::Tcp(stream));
		Ok(())
	}

	/// Open a connection to a local domain socket.
	#[cfg(unix)]
	pub async fn connect_unix(
		&mut self,
		path: impl AsRef<Path>,
		connect_timeout: Option<Duration>,
	) -> Result<(), ConnectionError> {
		let budget = self.effective_timeout(connect_timeout)?;
		self.release();

		let path = path.as_ref();
		debug!("connecting to {}", path.display());
		let stream = bounded(budget, UnixStream::connect(path)).await?;
		self.install(Stream::Unix(stream));
		Ok(())
	}

	/// Release the socket and all per-connection decode state.
	pub fn disconnect(&mut self) -> Result<(), ConnectionError> {
		if !self.connected() {
			return Err(ConnectionError::Usage("not connected"));
		}
		debug!("disconnecting");
		self.release();
		Ok(())
	}

	/// Set the default timeout for connects and readiness waits.
	pub fn set_timeout(&mut self, timeout: Duration) -> Result<(), ConnectionError> {
		if timeout.is_zero() {
			return Err(ConnectionError::Usage("timeout should be positive"));
		}
		self.timeout = Some(timeout);
		Ok(())
	}

	/// Queue an already-encoded command frame. The socket is not touched;
	/// the frame goes out with the next [`read`](Self::read).
	pub fn write(&mut self, frame: impl AsRef<[u8]>) -> Result<(), ConnectionError> {
		if !self.connected() {
			return Err(ConnectionError::Usage("not connected"));
		}
		let frame = frame.as_ref();
		self.wbuf.extend_from_slice(frame);
		trace!("queued {} outbound bytes", frame.len());
		Ok(())
	}

	/// Encode an argument list as a command frame and queue it.
	pub fn command<A>(&mut self, args: &[A]) -> Result<(), ConnectionError>
	where
		A: AsRef<[u8]>,
	{
		if args.is_empty() {
			return Err(ConnectionError::Usage("command needs at least one argument"));
		}
		self.write(resp::encode_command(args))
	}

	/// Retrieve the next reply, flushing queued commands first.
	///
	/// Replies are returned in the order their commands were written. A
	/// [`ConnectionError::Timeout`] leaves the connection intact, including
	/// any partially-sent outbound bytes, so the call can be retried with a
	/// longer budget; every other I/O or protocol failure disconnects.
	pub async fn read(&mut self) -> Result<Reply, ConnectionError> {
		if !self.connected() {
			return Err(ConnectionError::Usage("not connected"));
		}

		let result = self.get_reply().await;
		if let Err(err) = &result {
			if err.is_fatal() {
				debug!("dropping connection: {}", err);
				self.release();
			}
		}
		result
	}

	async fn get_reply(&mut self) -> Result<Reply, ConnectionError> {
		// A pipelined reply may already be buffered; no I/O then.
		match self.reader.next_reply() {
			ReadResult::Complete(reply) => return Ok(reply),
			ReadResult::Error(err) => return Err(err.into()),
			ReadResult::Incomplete => {}
		}

		// One budget for the whole call; the remaining slice is recomputed
		// from the wall clock before each wait.
		let deadline = self.timeout.map(|t| Instant::now() + t);

		let Self {
			stream,
			wbuf,
			reader,
			..
		} = self;
		let Some(stream) = stream.as_ref() else {
			return Err(ConnectionError::Usage("not connected"));
		};

		// Drain queued commands until the outbound buffer is empty.
		while !wbuf.is_empty() {
			match stream.try_write(wbuf) {
				Ok(0) => return Err(io::Error::from(io::ErrorKind::WriteZero).into()),
				Ok(n) => {
					trace!("sent {} bytes", n);
					wbuf.advance(n);
				}
				Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
					wait_ready(stream, Interest::WRITABLE, deadline).await?;
				}
				Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
				Err(e) => return Err(e.into()),
			}
		}

		// Receive until the decoder yields one complete reply.
		let mut chunk = [0u8; RECV_CHUNK];
		loop {
			match stream.try_read(&mut chunk) {
				Ok(0) => return Err(ConnectionError::Eof),
				Ok(n) => {
					trace!("received {} bytes", n);
					reader.feed(&chunk[..n]);
					match reader.next_reply() {
						ReadResult::Complete(reply) => return Ok(reply),
						ReadResult::Error(err) => return Err(err.into()),
						ReadResult::Incomplete => {}
					}
				}
				Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
					wait_ready(stream, Interest::READABLE, deadline).await?;
				}
				Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
				Err(e) => return Err(e.into()),
			}
		}
	}

	/// Effective budget for one operation: explicit argument first, then
	/// the per-connection default. An explicit zero is a caller bug.
	fn effective_timeout(
		&self,
		arg: Option<Duration>,
	) -> Result<Option<Duration>, ConnectionError> {
		match arg {
			Some(d) if d.is_zero() => Err(ConnectionError::Usage("timeout should be positive")),
			Some(d) => Ok(Some(d)),
			None => Ok(self.timeout),
		}
	}

	fn install(&mut self, stream: Stream) {
		self.stream = Some(stream);
		self.wbuf.clear();
		self.reader = ReplyReader::new();
	}

	// A decoder with partially parsed state must not survive onto a new
	// socket, so the reader is replaced together with the stream.
	fn release(&mut self) {
		self.stream = None;
		self.wbuf.clear();
		self.reader = ReplyReader::new();
	}
}

/// Run a connect future under an optional budget.
async fn bounded<F, T>(budget: Option<Duration>, fut: F) -> Result<T, ConnectionError>
where
	F: Future<Output = io::Result<T>>,
{
	match budget {
		Some(d) => match tokio::time::timeout(d, fut).await {
			Ok(res) => Ok(res?),
			Err(_) => Err(ConnectionError::Timeout),
		},
		None => Ok(fut.await?),
	}
}

/// Wait until the socket reports `interest`, bounded by what is left of the
/// deadline. Expiry is a synthetic [`ConnectionError::Timeout`], never a
/// misreported I/O result.
async fn wait_ready(
	stream: &Stream,
	interest: Interest,
	deadline: Option<Instant>,
) -> Result<(), ConnectionError> {
	match deadline {
		Some(deadline) => {
			let remaining = deadline.saturating_duration_since(Instant::now());
			if remaining.is_zero() {
				return Err(ConnectionError::Timeout);
			}
			match tokio::time::timeout(remaining, stream.ready(interest)).await {
				Ok(res) => {
					res?;
					Ok(())
				}
				Err(_) => Err(ConnectionError::Timeout),
			}
		}
		None => {
			stream.ready(interest).await?;
			Ok(())
		}
	}
}
