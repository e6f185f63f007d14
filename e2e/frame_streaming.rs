//! E2E Test Suite 02: Frame Streaming API
//!
//! Incremental sessions over `std::io` sources and sinks:
//! - Chunked writes and small-buffer reads (down to 1 byte at a time)
//! - Concatenated frames on one stream, drained frame by frame
//! - `io::Read`/`io::Write` facades
//! - Byte counters and lazy header parsing
//! - Temp-file round-trip

use std::io::{Read, Seek, SeekFrom, Write};

use lz4flow::frame::descriptor::{BlockSize, Descriptor};
use lz4flow::io::{
    frame_compress, FrameReadSession, FrameReadStream, FrameWriteSession, FrameWriteStream,
};
use lz4flow::Level;

fn log_lines(lines: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for i in 0..lines {
        out.extend_from_slice(
            format!("2026-08-28T10:{:02}:{:02}Z service=edge status=200 took={}ms\n",
                (i / 60) % 60, i % 60, i % 97)
            .as_bytes(),
        );
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: Chunked writes equal one-shot output semantics
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_chunked_writes_roundtrip() {
    let src = log_lines(20_000);
    let mut session =
        FrameWriteSession::new(Vec::new(), Descriptor::default(), Level::Fast).expect("writer");
    for chunk in src.chunks(777) {
        session.write(chunk).expect("write");
    }
    assert_eq!(session.bytes_written(), src.len() as u64);
    let wire = session.into_inner().expect("finish");

    let mut reader = FrameReadSession::new(wire.as_slice());
    let mut out = vec![0u8; src.len()];
    assert_eq!(reader.read(&mut out).expect("read"), src.len());
    assert_eq!(out, src);
    assert_eq!(reader.bytes_read(), src.len() as u64);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: One byte at a time, both directions
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_single_byte_granularity() {
    let src = b"streaming one byte at a time still has to work";
    let mut session =
        FrameWriteSession::new(Vec::new(), Descriptor::default(), Level::Fast).expect("writer");
    for &byte in src.iter() {
        session.write_u8(byte).expect("write_u8");
    }
    let wire = session.into_inner().expect("finish");

    let mut reader = FrameReadSession::new(wire.as_slice());
    let mut out = Vec::new();
    while let Some(byte) = reader.read_u8().expect("read_u8") {
        out.push(byte);
    }
    assert_eq!(out, src);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: Two concatenated frames, drained frame by frame
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_concatenated_frames_two_opens() {
    let s1 = b"first payload".repeat(1000);
    let s2 = b"second payload, different length".repeat(500);
    let mut stream = frame_compress(&s1, Level::Fast).expect("compress s1");
    stream.extend_from_slice(&frame_compress(&s2, Level::Hc9).expect("compress s2"));

    let mut reader = FrameReadSession::new(stream.as_slice());
    assert!(reader.open().expect("open first"));
    let mut out1 = vec![0u8; s1.len()];
    assert_eq!(reader.read(&mut out1).expect("read first"), s1.len());
    assert_eq!(out1, s1);

    // Second open on the same stream picks up the next frame.
    assert!(reader.open().expect("open second"));
    let mut out2 = vec![0u8; s2.len()];
    assert_eq!(reader.read(&mut out2).expect("read second"), s2.len());
    assert_eq!(out2, s2);

    let mut extra = [0u8; 8];
    assert_eq!(reader.read(&mut extra).expect("read at eof"), 0);
    assert!(!reader.open().expect("open at eof"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: std trait facades plug into generic code
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_std_trait_facades() {
    let src = log_lines(5000);
    let mut writer =
        FrameWriteStream::new(Vec::new(), Descriptor::default(), Level::Hc6).expect("writer");
    std::io::copy(&mut src.as_slice(), &mut writer).expect("copy in");
    let wire = writer.finish().expect("finish");

    let mut out = Vec::new();
    let mut reader = FrameReadStream::new(wire.as_slice());
    std::io::copy(&mut reader, &mut out).expect("copy out");
    assert_eq!(out, src);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: Temp-file round-trip through real file descriptors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_tempfile_roundtrip() {
    let src = log_lines(30_000);
    let mut file = tempfile::tempfile().expect("tempfile");

    let descriptor = Descriptor {
        block_size: BlockSize::Max64Kb,
        content_length: Some(src.len() as u64),
        ..Descriptor::default()
    };
    let mut session = FrameWriteSession::new(&mut file, descriptor, Level::Fast).expect("writer");
    session.write(&src).expect("write");
    session.finish().expect("finish");

    file.seek(SeekFrom::Start(0)).expect("seek");
    let mut reader = FrameReadSession::new(&mut file);
    assert_eq!(reader.frame_length().expect("length"), Some(src.len() as u64));
    let mut out = vec![0u8; src.len() + 1];
    let n = reader.read(&mut out).expect("read");
    assert_eq!(&out[..n], src.as_slice());
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 6: Dropping the write facade still terminates the frame
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_write_facade_drop_finishes() {
    let mut wire = Vec::new();
    {
        let mut writer =
            FrameWriteStream::new(&mut wire, Descriptor::default(), Level::Fast).expect("writer");
        writer.write_all(b"finalized by drop").expect("write");
    }
    let mut reader = FrameReadSession::new(wire.as_slice());
    let mut out = vec![0u8; 64];
    let n = reader.read(&mut out).expect("read");
    assert_eq!(&out[..n], b"finalized by drop");
}
