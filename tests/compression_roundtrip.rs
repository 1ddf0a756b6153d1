//! Chunked round trips over every registered compression algorithm.
//!
//! The core property: feeding input in chunks of any size and draining
//! output into buffers of any size must produce exactly the bytes a
//! single big call would, and decompressing them must restore the
//! original input bit for bit.

extern crate pixelcodec;
extern crate rand;

use pixelcodec::compression::{CompressionProvider, StopReason};
use rand::RngCore;

/// Compresses the payload pushing `input_chunk` sized pieces and
/// pulling through an `output_chunk` sized buffer.
fn compress_chunked(
    provider_index: usize, payload: &[u8], input_chunk: usize, output_chunk: usize
) -> Vec<u8> {
    let provider = CompressionProvider::new();
    let algorithm = provider.get(provider_index).unwrap();
    let mut compressor = algorithm.compressor().unwrap();

    let mut compressed = Vec::new();
    let mut scratch = vec![0_u8; output_chunk];

    let mut offset = 0;
    while offset < payload.len() {
        let end = (offset + input_chunk).min(payload.len());

        let mut chunk_offset = offset;
        while chunk_offset < end {
            let status = compressor.process(&payload[chunk_offset .. end], &mut scratch).unwrap();
            assert_ne!(status.reason, StopReason::Finished, "process never finishes a stream");

            chunk_offset += status.bytes_consumed;
            compressed.extend_from_slice(&scratch[.. status.bytes_written]);
        }

        offset = end;
    }

    loop {
        let status = compressor.finish(&mut scratch).unwrap();
        compressed.extend_from_slice(&scratch[.. status.bytes_written]);

        match status.reason {
            StopReason::Finished => break,
            StopReason::OutputBufferFull => continue,
            StopReason::InputBufferExhausted => panic!("finish cannot exhaust input"),
        }
    }

    compressed
}

/// Decompresses with the same chunking discipline.
fn decompress_chunked(
    provider_index: usize, compressed: &[u8], input_chunk: usize, output_chunk: usize
) -> Vec<u8> {
    let provider = CompressionProvider::new();
    let algorithm = provider.get(provider_index).unwrap();
    let mut decompressor = algorithm.decompressor().unwrap();

    let mut restored = Vec::new();
    let mut scratch = vec![0_u8; output_chunk];

    let mut offset = 0;
    while offset < compressed.len() {
        let end = (offset + input_chunk).min(compressed.len());

        let mut chunk_offset = offset;
        while chunk_offset < end {
            let status = decompressor.process(&compressed[chunk_offset .. end], &mut scratch).unwrap();

            chunk_offset += status.bytes_consumed;
            restored.extend_from_slice(&scratch[.. status.bytes_written]);

            // a full output buffer with nothing consumed still makes
            // progress, the written bytes were just drained above
            if status.bytes_consumed == 0 && status.bytes_written == 0 {
                assert_eq!(status.reason, StopReason::InputBufferExhausted);
                break;
            }
        }

        offset = end;
    }

    loop {
        let status = decompressor.finish(&mut scratch).unwrap();
        restored.extend_from_slice(&scratch[.. status.bytes_written]);

        if status.reason == StopReason::Finished { break; }
        assert_eq!(status.reason, StopReason::OutputBufferFull);
    }

    restored
}

fn random_payload(byte_count: usize) -> Vec<u8> {
    let mut payload = vec![0_u8; byte_count];
    rand::rng().fill_bytes(&mut payload);
    payload
}

fn compressible_payload(byte_count: usize) -> Vec<u8> {
    b"all work and no play makes jack a dull boy. ".iter()
        .cycle().take(byte_count).copied().collect()
}

fn algorithm_count() -> usize {
    CompressionProvider::new().count()
}


#[test]
fn every_algorithm_round_trips_compressible_data() {
    let payload = compressible_payload(100_000);

    for index in 0 .. algorithm_count() {
        let compressed = compress_chunked(index, &payload, 65536, 65536);
        assert!(compressed.len() < payload.len(), "repetitive text must shrink");

        let restored = decompress_chunked(index, &compressed, 65536, 65536);
        assert_eq!(restored, payload);
    }
}

#[test]
fn every_algorithm_round_trips_random_data() {
    let payload = random_payload(50_000);

    for index in 0 .. algorithm_count() {
        let compressed = compress_chunked(index, &payload, 65536, 65536);
        let restored = decompress_chunked(index, &compressed, 65536, 65536);
        assert_eq!(restored, payload);
    }
}

#[test]
fn chunk_sizes_do_not_change_the_output() {
    let payload = compressible_payload(10_000);

    for index in 0 .. algorithm_count() {
        let reference = compress_chunked(index, &payload, payload.len(), payload.len() * 2);

        for &(input_chunk, output_chunk) in &[(1, 65536), (7, 64), (64, 7), (65536, 1), (7, 7)] {
            let chunked = compress_chunked(index, &payload, input_chunk, output_chunk);
            assert_eq!(
                chunked, reference,
                "algorithm {} produced different bytes with chunks ({}, {})",
                index, input_chunk, output_chunk,
            );
        }
    }
}

#[test]
fn chunked_decompression_restores_the_payload() {
    let payload = compressible_payload(10_000);

    for index in 0 .. algorithm_count() {
        let compressed = compress_chunked(index, &payload, 65536, 65536);

        for &(input_chunk, output_chunk) in &[(1, 65536), (64, 7), (7, 64), (65536, 1)] {
            let restored = decompress_chunked(index, &compressed, input_chunk, output_chunk);
            assert_eq!(
                restored, payload,
                "algorithm {} lost data with chunks ({}, {})",
                index, input_chunk, output_chunk,
            );
        }
    }
}

#[test]
fn boundary_payload_sizes_round_trip() {
    // sizes crossing the usual internal block thresholds
    for &byte_count in &[0_usize, 1, 2, 255, 256, 257, 65535, 65536, 65537] {
        let payload = compressible_payload(byte_count);

        for index in 0 .. algorithm_count() {
            let compressed = compress_chunked(index, &payload, 4096, 4096);
            let restored = decompress_chunked(index, &compressed, 4096, 4096);

            assert_eq!(
                restored, payload,
                "algorithm {} failed at payload size {}", index, byte_count,
            );
        }
    }
}

#[test]
fn several_megabytes_survive() {
    let mut payload = compressible_payload(2 * 1024 * 1024);

    // splice random stretches in so the stream is not trivially repetitive
    let noise = random_payload(256 * 1024);
    payload[512 * 1024 .. 512 * 1024 + noise.len()].copy_from_slice(&noise);

    for index in 0 .. algorithm_count() {
        let compressed = compress_chunked(index, &payload, 65536, 65536);
        let restored = decompress_chunked(index, &compressed, 65536, 65536);
        assert_eq!(restored, payload, "algorithm {} corrupted a large stream", index);
    }
}
