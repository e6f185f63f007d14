//! Block codec throughput across compression levels.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use lz4flow::block::compress_bound;
use lz4flow::codec::{decode_block, encode_block};
use lz4flow::Level;

fn sample_text(bytes: usize) -> Vec<u8> {
    let mut state = 0x1234_5678u32;
    let words: [&[u8]; 8] = [
        b"the ", b"compression ", b"of ", b"highly ", b"repetitive ", b"streams ", b"is ",
        b"cheap ",
    ];
    let mut out = Vec::with_capacity(bytes + 16);
    while out.len() < bytes {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        out.extend_from_slice(words[(state >> 29) as usize & 7]);
    }
    out.truncate(bytes);
    out
}

fn bench_encode(c: &mut Criterion) {
    let src = sample_text(256 * 1024);
    let mut dst = vec![0u8; compress_bound(src.len())];
    let mut group = c.benchmark_group("block/encode");
    group.throughput(Throughput::Bytes(src.len() as u64));
    for level in [Level::Fast, Level::Hc3, Level::Hc9, Level::Opt10, Level::Max] {
        group.bench_with_input(BenchmarkId::from_parameter(format!("{level:?}")), &src, |b, src| {
            b.iter(|| encode_block(src, &mut dst, level).unwrap());
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let src = sample_text(256 * 1024);
    let mut encoded = vec![0u8; compress_bound(src.len())];
    let n = encode_block(&src, &mut encoded, Level::Hc9).unwrap();
    encoded.truncate(n);
    let mut out = vec![0u8; src.len()];

    let mut group = c.benchmark_group("block/decode");
    group.throughput(Throughput::Bytes(src.len() as u64));
    group.bench_function("decode", |b| {
        b.iter(|| decode_block(&encoded, &mut out).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
