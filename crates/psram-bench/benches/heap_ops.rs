//! Criterion micro-benchmarks for the four heap operations.

use std::hint::black_box;
use std::ptr;

use criterion::{criterion_group, criterion_main, Criterion};
use psram_alloc::{allocate, free, reallocate, zero_allocate};
use psram_bench::size_trace;
use psram_core::{Heap, Tier};
use psram_test_utils::tiered;

fn bench_allocate_free_trace(c: &mut Criterion) {
    let trace = size_trace(1024, 1);
    c.bench_function("platform_allocate_free_1k", |b| {
        b.iter(|| {
            for &size in &trace {
                let p = allocate(black_box(size));
                unsafe { free(p) };
            }
        });
    });
}

fn bench_zero_allocate(c: &mut Criterion) {
    c.bench_function("platform_zero_allocate_4k", |b| {
        b.iter(|| {
            let p = zero_allocate(black_box(1024), 4);
            unsafe { free(p) };
        });
    });
}

fn bench_reallocate_growth(c: &mut Criterion) {
    c.bench_function("platform_reallocate_double_to_64k", |b| {
        b.iter(|| unsafe {
            let mut p = reallocate(ptr::null_mut(), 16);
            let mut size = 16;
            while size < 64 * 1024 {
                size *= 2;
                p = reallocate(p, black_box(size));
            }
            free(p);
        });
    });
}

/// Cost of the tier policy itself: every request misses the preferred pool
/// and takes the fallback retry.
fn bench_fallback_path(c: &mut Criterion) {
    let heap = tiered(1 << 20, 1 << 20);
    heap.backend().exhaust(Tier::Preferred);
    let trace = size_trace(256, 2);
    c.bench_function("simulated_fallback_256", |b| {
        b.iter(|| {
            for &size in &trace {
                let p = heap.allocate(black_box(size));
                unsafe { heap.free(p) };
            }
            heap.backend().clear_calls();
        });
    });
}

fn bench_preferred_path(c: &mut Criterion) {
    let heap = tiered(1 << 20, 1 << 20);
    let trace = size_trace(256, 2);
    c.bench_function("simulated_preferred_256", |b| {
        b.iter(|| {
            for &size in &trace {
                let p = heap.allocate(black_box(size));
                unsafe { heap.free(p) };
            }
            heap.backend().clear_calls();
        });
    });
}

criterion_group!(
    benches,
    bench_allocate_free_trace,
    bench_zero_allocate,
    bench_reallocate_growth,
    bench_fallback_path,
    bench_preferred_path,
);
criterion_main!(benches);
