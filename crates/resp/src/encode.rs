//! Command frames and the wire writer for reply values.

use bytes::BufMut;
use bytes::Bytes;
use bytes::BytesMut;

use crate::types::Reply;
use crate::utils::*;

/// Serialize an ordered argument list into one RESP command frame:
/// `*<n>\r\n$<len>\r\n<arg>\r\n...`
///
/// Arguments are opaque byte strings; the caller decides what they mean.
pub fn encode_command<A>(args: &[A]) -> Bytes
where
	A: AsRef<[u8]>,
{
	let mut buf = BytesMut::new();
	put_length(&mut buf, MULTI_BULK, args.len());
	for arg in args {
		let arg = arg.as_ref();
		put_length(&mut buf, BULK, arg.len());
		buf.put_slice(arg);
		buf.put_slice(CRLF);
	}
	buf.freeze()
}

/// Wire encoding for [`Reply`] values.
///
/// Strings always encode as bulk strings and nil as `$-1\r\n`, so any value
/// a reader produces round-trips through its own wire form.
pub trait ReplyEncoder {
	fn encode_to(&self, buf: &mut BytesMut);

	fn encode(&self) -> Bytes {
		let mut buf = BytesMut::new();
		self.encode_to(&mut buf);
		buf.freeze()
	}
}

impl ReplyEncoder for Reply {
	fn encode_to(&self, buf: &mut BytesMut) {
		match self {
			Reply::Nil => {
				buf.put_slice(b"$-1");
				buf.put_slice(CRLF);
			}
			Reply::Integer(i) => {
				buf.put_u8(INTEGER);
				buf.put_slice(i.to_string().as_bytes());
				buf.put_slice(CRLF);
			}
			Reply::String(s) => {
				put_length(buf, BULK, s.len());
				buf.put_slice(s);
				buf.put_slice(CRLF);
			}
			Reply::Error(e) => {
				buf.put_u8(ERROR);
				buf.put_slice(e);
				buf.put_slice(CRLF);
			}
			Reply::Array(arr) => {
				put_length(buf, MULTI_BULK, arr.len());
				for item in arr.items() {
					item.encode_to(buf);
				}
			}
		}
	}
}

#[inline]
fn put_length(buf: &mut BytesMut, marker: u8, length: usize) {
	buf.put_u8(marker);
	buf.put_slice(length.to_string().as_bytes());
	buf.put_slice(CRLF);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_encode_command_single_arg() {
		let frame = encode_command(&["PING"]);
		assert_eq!(frame, b"*1\r\n$4\r\nPING\r\n".as_slice());
	}

	#[test]
	fn test_encode_command_multiple_args() {
		let frame = encode_command(&["SET", "key", "value"]);
		assert_eq!(
			frame,
			b"*3\r\n$3\r\nSET\r\n$3\r\nkey\r\n$5\r\nvalue\r\n".as_slice()
		);
	}

	#[test]
	fn test_encode_command_binary_arg() {
		let frame = encode_command(&[b"GET".as_slice(), b"\x00\xff".as_slice()]);
		assert_eq!(frame, b"*2\r\n$3\r\nGET\r\n$2\r\n\x00\xff\r\n".as_slice());
	}

	#[test]
	fn test_encode_nil() {
		assert_eq!(Reply::Nil.encode(), b"$-1\r\n".as_slice());
	}

	#[test]
	fn test_encode_array() {
		let reply = Reply::array(vec![Reply::string("foo"), Reply::Integer(7)]);
		assert_eq!(reply.encode(), b"*2\r\n$3\r\nfoo\r\n:7\r\n".as_slice());
	}
}
