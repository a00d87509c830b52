//! Allocator benchmarks
//!
//! Compares the four pool strategies against the system allocator

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use nebula_alloc::prelude::*;
use std::alloc::Layout;
use std::hint::black_box;

/// Benchmark single allocation/deallocation cycle
fn bench_single_allocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_allocation");
    let layout = Layout::from_size_align(64, 8).unwrap();

    group.bench_function("slab_64b", |b| {
        let allocator = SlabPool::new(SlabConfig::production(64).with_max_count(1024)).unwrap();

        b.iter(|| unsafe {
            let ptr = allocator.allocate(layout).unwrap();
            allocator.deallocate(ptr.cast(), layout);
            black_box(ptr);
        });
    });

    group.bench_function("bump_64b", |b| {
        let mut allocator = BumpChunks::new(BumpConfig::production()).unwrap();

        b.iter(|| {
            let ptr = allocator.allocate(layout).unwrap();
            black_box(ptr);
            // Bump memory is only reclaimed in bulk
            if allocator.chunk_count() > 16 {
                allocator.clear();
            }
        });
    });

    group.bench_function("scratch_64b", |b| {
        let allocator = ScratchArena::new(ScratchConfig::production()).unwrap();

        b.iter(|| unsafe {
            let ptr = allocator.allocate(layout).unwrap();
            allocator.deallocate(ptr.cast(), layout);
            black_box(ptr);
        });
    });

    group.bench_function("bucket_64b", |b| {
        let allocator = BucketPool::new(BucketConfig::production()).unwrap();

        b.iter(|| unsafe {
            let ptr = allocator.allocate(layout).unwrap();
            allocator.deallocate(ptr.cast(), layout);
            black_box(ptr);
        });
    });

    // System allocator (baseline)
    group.bench_function("system_64b", |b| {
        b.iter(|| unsafe {
            let ptr = std::alloc::alloc(layout);
            std::alloc::dealloc(ptr, layout);
            black_box(ptr);
        });
    });

    group.finish();
}

/// Benchmark batch allocations
fn bench_batch_allocations(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_allocations");
    group.throughput(Throughput::Elements(100));
    let layout = Layout::from_size_align(64, 8).unwrap();

    group.bench_function("slab_100x64b", |b| {
        let allocator = SlabPool::new(SlabConfig::production(64).with_max_count(1024)).unwrap();

        b.iter(|| unsafe {
            let mut ptrs = Vec::with_capacity(100);
            for _ in 0..100 {
                ptrs.push(allocator.allocate(layout).unwrap());
            }
            for ptr in ptrs {
                allocator.deallocate(ptr.cast(), layout);
            }
        });
    });

    group.bench_function("bump_100x64b", |b| {
        let mut allocator = BumpChunks::new(BumpConfig::production()).unwrap();

        b.iter(|| {
            for _ in 0..100 {
                black_box(allocator.allocate(layout).unwrap());
            }
            allocator.clear();
        });
    });

    group.bench_function("scratch_100x64b", |b| {
        let allocator = ScratchArena::new(ScratchConfig::production()).unwrap();

        b.iter(|| unsafe {
            let mut ptrs = Vec::with_capacity(100);
            for _ in 0..100 {
                ptrs.push(allocator.allocate(layout).unwrap());
            }
            for ptr in ptrs.into_iter().rev() {
                allocator.deallocate(ptr.cast(), layout);
            }
        });
    });

    group.bench_function("bucket_100x64b", |b| {
        let allocator = BucketPool::new(BucketConfig::production()).unwrap();

        b.iter(|| unsafe {
            let mut ptrs = Vec::with_capacity(100);
            for _ in 0..100 {
                ptrs.push(allocator.allocate(layout).unwrap());
            }
            for ptr in ptrs {
                allocator.deallocate(ptr.cast(), layout);
            }
        });
    });

    group.finish();
}

/// Benchmark mixed sizes through the bucket pool
fn bench_bucket_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("bucket_sizes");

    for size in [8usize, 48, 200, 1024] {
        let layout = Layout::from_size_align(size, 8).unwrap();
        group.bench_with_input(BenchmarkId::new("bucket", size), &layout, |b, &layout| {
            let allocator = BucketPool::new(BucketConfig::production()).unwrap();

            b.iter(|| unsafe {
                let ptr = allocator.allocate(layout).unwrap();
                allocator.deallocate(ptr.cast(), layout);
                black_box(ptr);
            });
        });
        group.bench_with_input(BenchmarkId::new("system", size), &layout, |b, &layout| {
            b.iter(|| unsafe {
                let ptr = std::alloc::alloc(layout);
                std::alloc::dealloc(ptr, layout);
                black_box(ptr);
            });
        });
    }

    group.finish();
}

/// Benchmark container growth
fn bench_pool_vec(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_vec");
    group.throughput(Throughput::Elements(1000));

    group.bench_function("bucket_push_1000", |b| {
        let pool = BucketPool::new(BucketConfig::production()).unwrap();

        b.iter(|| {
            let mut values = PoolVec::new_in(&pool);
            for i in 0..1000u64 {
                values.push(i).unwrap();
            }
            black_box(values.len());
        });
    });

    group.bench_function("std_push_1000", |b| {
        b.iter(|| {
            let mut values = Vec::new();
            for i in 0..1000u64 {
                values.push(i);
            }
            black_box(values.len());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_single_allocation,
    bench_batch_allocations,
    bench_bucket_sizes,
    bench_pool_vec
);
criterion_main!(benches);
