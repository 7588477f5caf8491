use resp::Reply;
use resp::ReplyEncoder;
use resp::encode_command;
use rstest::rstest;

#[test]
fn test_command_frame_layout() {
	let frame = encode_command(&["LPUSH", "queue", "job-1"]);
	assert_eq!(
		frame,
		b"*3\r\n$5\r\nLPUSH\r\n$5\r\nqueue\r\n$5\r\njob-1\r\n".as_slice()
	);
}

#[test]
fn test_command_with_empty_argument() {
	let frame = encode_command(&["SET", "key", ""]);
	assert_eq!(frame, b"*3\r\n$3\r\nSET\r\n$3\r\nkey\r\n$0\r\n\r\n".as_slice());
}

#[test]
fn test_command_argument_with_crlf() {
	// Bulk framing is length-prefixed, so CRLF inside an argument is data.
	let frame = encode_command(&["ECHO", "a\r\nb"]);
	assert_eq!(frame, b"*2\r\n$4\r\nECHO\r\n$4\r\na\r\nb\r\n".as_slice());
}

#[rstest]
#[case(Reply::Nil, b"$-1\r\n")]
#[case(Reply::Integer(1000), b":1000\r\n")]
#[case(Reply::Integer(-1), b":-1\r\n")]
#[case(Reply::string("OK"), b"$2\r\nOK\r\n")]
#[case(Reply::error("ERR bad"), b"-ERR bad\r\n")]
#[case(Reply::array(vec![]), b"*0\r\n")]
fn test_reply_wire_forms(#[case] value: Reply, #[case] expected: &[u8]) {
	assert_eq!(value.encode(), expected);
}

#[test]
fn test_nested_array_encoding() {
	let value = Reply::array(vec![
		Reply::array(vec![Reply::Integer(1), Reply::Integer(2)]),
		Reply::Nil,
	]);
	assert_eq!(
		value.encode(),
		b"*2\r\n*2\r\n:1\r\n:2\r\n$-1\r\n".as_slice()
	);
}
