//! Performance benchmarks for the reply reader and command encoder

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use resp::{ReadResult, Reply, ReplyEncoder, ReplyReader, encode_command};
use std::hint::black_box;

fn decode(input: &[u8]) -> Reply {
	let mut reader = ReplyReader::new();
	reader.feed(input);
	match reader.next_reply() {
		ReadResult::Complete(reply) => reply,
		other => panic!("expected Complete, got {:?}", other),
	}
}

fn bench_decode_status(c: &mut Criterion) {
	let mut group = c.benchmark_group("decode_status");
	let data = b"+OK\r\n";

	group.throughput(Throughput::Bytes(data.len() as u64));
	group.bench_function("status", |b| b.iter(|| decode(black_box(data))));
	group.finish();
}

fn bench_decode_bulk(c: &mut Criterion) {
	let mut group = c.benchmark_group("decode_bulk");
	let data = b"$11\r\nhello world\r\n";

	group.throughput(Throughput::Bytes(data.len() as u64));
	group.bench_function("bulk", |b| b.iter(|| decode(black_box(data))));
	group.finish();
}

fn bench_decode_integer(c: &mut Criterion) {
	let mut group = c.benchmark_group("decode_integer");
	let data = b":1000\r\n";

	group.throughput(Throughput::Bytes(data.len() as u64));
	group.bench_function("integer", |b| b.iter(|| decode(black_box(data))));
	group.finish();
}

fn bench_decode_multi_bulk(c: &mut Criterion) {
	let mut group = c.benchmark_group("decode_multi_bulk");

	// 100 element reply, the shape of a large LRANGE response
	let mut data = Vec::from(&b"*100\r\n"[..]);
	for i in 0..100 {
		data.extend_from_slice(format!("$3\r\n{:03}\r\n", i).as_bytes());
	}

	group.throughput(Throughput::Bytes(data.len() as u64));
	group.bench_function("multi_bulk_100", |b| b.iter(|| decode(black_box(&data))));
	group.finish();
}

fn bench_decode_chunked(c: &mut Criterion) {
	let mut group = c.benchmark_group("decode_chunked");
	let data = b"*2\r\n$5\r\nhello\r\n$5\r\nworld\r\n";

	group.throughput(Throughput::Bytes(data.len() as u64));
	group.bench_function("byte_at_a_time", |b| {
		b.iter(|| {
			let mut reader = ReplyReader::new();
			for chunk in black_box(&data[..]).chunks(1) {
				reader.feed(chunk);
			}
			match reader.next_reply() {
				ReadResult::Complete(reply) => reply,
				other => panic!("expected Complete, got {:?}", other),
			}
		})
	});
	group.finish();
}

fn bench_encode_command(c: &mut Criterion) {
	let mut group = c.benchmark_group("encode_command");

	group.bench_function("set_command", |b| {
		b.iter(|| encode_command(black_box(&["SET", "key", "value"])))
	});
	group.finish();
}

fn bench_roundtrip(c: &mut Criterion) {
	let mut group = c.benchmark_group("roundtrip");
	let value = Reply::array(vec![
		Reply::string("SET"),
		Reply::string("key"),
		Reply::string("value"),
	]);

	group.bench_function("encode_decode", |b| {
		b.iter(|| decode(&black_box(&value).encode()))
	});
	group.finish();
}

criterion_group!(
	benches,
	bench_decode_status,
	bench_decode_bulk,
	bench_decode_integer,
	bench_decode_multi_bulk,
	bench_decode_chunked,
	bench_encode_command,
	bench_roundtrip,
);

criterion_main!(benches);
