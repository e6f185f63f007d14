//! End-to-end frame throughput over in-memory buffers.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use lz4flow::frame::descriptor::{BlockSize, Descriptor};
use lz4flow::io::{frame_compress_with, frame_decompress};
use lz4flow::Level;

fn log_like(bytes: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes + 80);
    let mut i = 0u64;
    while out.len() < bytes {
        i += 1;
        out.extend_from_slice(
            format!("ts={i} level=info msg=\"request served\" bytes={}\n", i * 37 % 8192)
                .as_bytes(),
        );
    }
    out.truncate(bytes);
    out
}

fn bench_compress(c: &mut Criterion) {
    let src = log_like(1 << 20);
    let mut group = c.benchmark_group("frame/compress");
    group.throughput(Throughput::Bytes(src.len() as u64));
    for block_size in [BlockSize::Max64Kb, BlockSize::Max1Mb] {
        for level in [Level::Fast, Level::Hc9] {
            let descriptor = Descriptor {
                block_size,
                ..Descriptor::default()
            };
            let id = format!("{block_size:?}/{level:?}");
            group.bench_with_input(BenchmarkId::from_parameter(id), &src, |b, src| {
                b.iter(|| frame_compress_with(src, descriptor.clone(), level).unwrap());
            });
        }
    }
    group.finish();
}

fn bench_decompress(c: &mut Criterion) {
    let src = log_like(1 << 20);
    let descriptor = Descriptor {
        block_size: BlockSize::Max64Kb,
        ..Descriptor::default()
    };
    let wire = frame_compress_with(&src, descriptor, Level::Hc9).unwrap();

    let mut group = c.benchmark_group("frame/decompress");
    group.throughput(Throughput::Bytes(src.len() as u64));
    group.bench_function("chained-64k", |b| {
        b.iter(|| frame_decompress(&wire).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress);
criterion_main!(benches);
