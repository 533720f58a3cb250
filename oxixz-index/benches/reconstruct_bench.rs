//! Benchmarks for backward Index reconstruction.
//!
//! Measures:
//! - Files with many Blocks in one Stream (Index decoding dominates)
//! - Files with many small Streams (footer/header round trips dominate)
//! - Long runs of Stream Padding with different read buffer sizes

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxixz_core::crc::Crc32;
use oxixz_index::{CheckType, ScanOptions, StreamFlags, encode_vli, reconstruct_with};
use std::hint::black_box;
use std::io::Cursor;

/// Build one Stream with `blocks` filler Blocks of 64 bytes each.
fn build_stream(blocks: usize, padding: usize) -> Vec<u8> {
    let flags = StreamFlags::new(CheckType::Crc64);
    let mut out = flags.encode_header().expect("header").to_vec();
    out.extend(std::iter::repeat_n(0x5A, blocks * 64));

    let mut index = vec![0x00];
    encode_vli(&mut index, blocks as u64).expect("count");
    for _ in 0..blocks {
        encode_vli(&mut index, 64).expect("unpadded");
        encode_vli(&mut index, 4096).expect("uncompressed");
    }
    while index.len() % 4 != 0 {
        index.push(0);
    }
    let crc = Crc32::compute(&index);
    index.extend_from_slice(&crc.to_le_bytes());

    let footer = flags.with_backward_size(index.len() as u64);
    out.extend_from_slice(&index);
    out.extend_from_slice(&footer.encode_footer().expect("footer"));
    out.extend(std::iter::repeat_n(0u8, padding));
    out
}

fn bench_many_blocks(c: &mut Criterion) {
    let mut group = c.benchmark_group("many_blocks");

    for blocks in [16usize, 1024, 65536] {
        let data = build_stream(blocks, 0);
        group.throughput(Throughput::Elements(blocks as u64));
        group.bench_with_input(BenchmarkId::from_parameter(blocks), &data, |b, data| {
            b.iter(|| {
                let info =
                    reconstruct_with(&mut Cursor::new(data), &ScanOptions::default()).expect("scan");
                black_box(info.block_count)
            });
        });
    }

    group.finish();
}

fn bench_many_streams(c: &mut Criterion) {
    let mut group = c.benchmark_group("many_streams");

    for streams in [4usize, 256, 4096] {
        let data: Vec<u8> = (0..streams).flat_map(|_| build_stream(2, 4)).collect();
        group.throughput(Throughput::Elements(streams as u64));
        group.bench_with_input(BenchmarkId::from_parameter(streams), &data, |b, data| {
            b.iter(|| {
                let info =
                    reconstruct_with(&mut Cursor::new(data), &ScanOptions::default()).expect("scan");
                black_box(info.stream_count)
            });
        });
    }

    group.finish();
}

fn bench_padding(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream_padding");
    let data = build_stream(4, 1 << 20);
    group.throughput(Throughput::Bytes(data.len() as u64));

    for buffer_size in [12usize, 1024, 8192, 65536] {
        let options = ScanOptions::new().with_buffer_size(buffer_size);
        group.bench_with_input(
            BenchmarkId::from_parameter(buffer_size),
            &options,
            |b, options| {
                b.iter(|| {
                    let info = reconstruct_with(&mut Cursor::new(&data), options).expect("scan");
                    black_box(info.stream_padding)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_many_blocks, bench_many_streams, bench_padding);
criterion_main!(benches);
