//! Benchmark tests for giztoy-pipe.
//!
//! Run with: cargo bench -p giztoy-pipe

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::thread;

use giztoy_pipe::{Endpoint, RingBuffer, pair, pipe};

const TOTAL: usize = 1024 * 1024;

/// Streams `TOTAL` bytes from `w` to `r` on two threads.
fn stream(w: &Endpoint, r: &Endpoint, write_chunk: usize, read_chunk: usize) {
    thread::scope(|s| {
        s.spawn(|| {
            let data = vec![0xa5u8; write_chunk];
            let mut left = TOTAL;
            while left > 0 {
                let n = write_chunk.min(left);
                w.write(&data[..n]).unwrap();
                left -= n;
            }
        });

        let mut buf = vec![0u8; read_chunk];
        let mut left = TOTAL;
        while left > 0 {
            left -= r.read(&mut buf).unwrap();
        }
    });
}

/// Benchmark: one writer, one reader, varying ring capacity.
fn bench_pipe_capacity(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipe_capacity");
    group.throughput(Throughput::Bytes(TOTAL as u64));

    for capacity in [4096usize, 16 * 1024, 64 * 1024, 1024 * 1024] {
        let (w, r) = pipe(capacity).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, _| {
            b.iter(|| stream(&w, &r, 8 * 1024, 7 * 1024));
        });
    }

    group.finish();
}

/// Benchmark: chunk sizes through a 64 KiB ring.
fn bench_chunk_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk_size");
    group.throughput(Throughput::Bytes(TOTAL as u64));

    let (w, r) = pipe(64 * 1024).unwrap();
    for chunk in [64usize, 512, 4096, 32 * 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(chunk), &chunk, |b, &chunk| {
            b.iter(|| stream(&w, &r, chunk, chunk));
        });
    }

    group.finish();
}

/// Benchmark: round trips over a bidirectional pair.
fn bench_pair_ping_pong(c: &mut Criterion) {
    let (a, b) = pair(4096).unwrap();
    let payload = [1u8; 64];

    c.bench_function("pair_ping_pong_64b", |bench| {
        bench.iter(|| {
            thread::scope(|s| {
                s.spawn(|| {
                    let mut buf = [0u8; 64];
                    let mut got = 0;
                    while got < buf.len() {
                        got += b.read(&mut buf[got..]).unwrap();
                    }
                    b.write(&buf).unwrap();
                });

                a.write(&payload).unwrap();
                let mut buf = [0u8; 64];
                let mut got = 0;
                while got < buf.len() {
                    got += a.read(&mut buf[got..]).unwrap();
                }
            });
        });
    });
}

/// Benchmark: uncontended put/get on a single thread.
fn bench_ring_put_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_put_get");

    for size in [64usize, 1024, 8192] {
        let ring = RingBuffer::new(16 * 1024).unwrap();
        let data = vec![0u8; size];
        let mut out = vec![0u8; size];

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                ring.put(&data).unwrap();
                let mut got = 0;
                while got < size {
                    got += ring.get(&mut out[got..]).unwrap();
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_pipe_capacity,
    bench_chunk_size,
    bench_pair_ping_pong,
    bench_ring_put_get
);
criterion_main!(benches);
