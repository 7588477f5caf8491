use resp::ReadResult;
use resp::ReplyReader;

fn main() {
	println!("--- RESP Streaming Decode Example ---");

	// Simulate a TCP stream delivering three replies in fragments:
	// - A status reply: "+OK\r\n"
	// - An integer reply: ":1000\r\n"
	// - A multi bulk reply: "*2\r\n$5\r\nhello\r\n$5\r\nworld\r\n"
	let chunks = vec![
		b"+O".as_slice(),
		b"K\r\n:1".as_slice(),
		b"00".as_slice(),
		b"0\r\n*2\r\n$5\r\nhe".as_slice(),
		b"llo\r\n$5\r\nw".as_slice(),
		b"orld\r\n".as_slice(),
	];

	let mut reader = ReplyReader::new();

	for (i, chunk) in chunks.iter().enumerate() {
		println!(
			"\n[Stream] Received chunk {}: {:?}",
			i,
			String::from_utf8_lossy(chunk)
		);

		reader.feed(chunk);

		loop {
			// A single chunk may complete more than one reply.
			match reader.next_reply() {
				ReadResult::Complete(reply) => {
					println!("[Reader] Complete: {:?}", reply);
				}
				ReadResult::Incomplete => {
					println!("[Reader] Incomplete, waiting for more data...");
					break;
				}
				ReadResult::Error(e) => {
					eprintln!("[Reader] Error: {:?}", e);
					return;
				}
			}
		}
	}
}
