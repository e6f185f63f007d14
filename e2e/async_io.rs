//! E2E Test Suite 06: Async Drivers (feature `async`)
//!
//! The tokio drivers must be byte-for-byte equivalent to the blocking
//! path: same cores, different byte movers.

use lz4flow::frame::descriptor::Descriptor;
use lz4flow::io::{frame_compress, frame_decompress, AsyncFrameReader, AsyncFrameWriter};
use lz4flow::Level;

fn sample(bytes: usize) -> Vec<u8> {
    b"asynchronous pipelines carry the same frames as synchronous ones. "
        .iter()
        .copied()
        .cycle()
        .take(bytes)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: Async write → sync decode
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_async_write_sync_read() {
    let src = sample(300_000);
    let mut writer =
        AsyncFrameWriter::new(Vec::new(), Descriptor::default(), Level::Fast).expect("writer");
    for chunk in src.chunks(10_000) {
        writer.write(chunk).await.expect("write");
    }
    writer.finish().await.expect("finish");
    assert_eq!(writer.bytes_written(), src.len() as u64);
    let wire = writer.into_inner();
    assert_eq!(frame_decompress(&wire).expect("decode"), src);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: Sync encode → async read
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sync_write_async_read() {
    let src = sample(250_000);
    let wire = frame_compress(&src, Level::Hc6).expect("encode");

    let mut reader = AsyncFrameReader::new(wire.as_slice());
    assert_eq!(reader.frame_length().await.expect("length"), Some(src.len() as u64));
    let mut out = vec![0u8; src.len() + 1];
    let n = reader.read(&mut out).await.expect("read");
    assert_eq!(&out[..n], src.as_slice());
    assert_eq!(reader.bytes_read(), src.len() as u64);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: Async output is identical to sync output
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_async_matches_sync_bytes() {
    let src = sample(128 * 1024);
    let sync_wire = frame_compress(&src, Level::Fast).expect("sync encode");

    let descriptor = Descriptor {
        content_length: Some(src.len() as u64),
        block_size: lz4flow::BlockSize::fitting(src.len() as u64),
        ..Descriptor::default()
    };
    let mut writer = AsyncFrameWriter::new(Vec::new(), descriptor, Level::Fast).expect("writer");
    writer.write(&src).await.expect("write");
    writer.finish().await.expect("finish");
    assert_eq!(writer.into_inner(), sync_wire);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: Duplex pipe between async writer and async reader
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_through_duplex_pipe() {
    let src = sample(200_000);
    let (client, server) = tokio::io::duplex(16 * 1024);

    let produce = {
        let src = src.clone();
        tokio::spawn(async move {
            let mut writer =
                AsyncFrameWriter::new(client, Descriptor::default(), Level::Fast).expect("writer");
            writer.write(&src).await.expect("write");
            writer.finish().await.expect("finish");
        })
    };

    let mut reader = AsyncFrameReader::new(server);
    let mut out = vec![0u8; src.len() + 1];
    let mut done = 0;
    loop {
        let n = reader.read_some(&mut out[done..]).await.expect("read");
        if n == 0 {
            break;
        }
        done += n;
    }
    produce.await.expect("producer");
    assert_eq!(&out[..done], src.as_slice());
}
