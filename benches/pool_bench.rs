use std::hint::black_box;
use std::sync::Arc;
use std::thread;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use crossbeam_utils::sync::WaitGroup;
use jobpool::{BoundedQueue, Job, PushError, WorkerPool};
use rand::prelude::*;

const JOBS: usize = 1000;

fn spin(iterations: u32) {
    let mut acc = 0u64;
    for i in 0..iterations {
        acc = acc.wrapping_add(black_box(i as u64));
    }
    black_box(acc);
}

fn submit_all(pool: &WorkerPool, costs: &[u32]) {
    let wg = WaitGroup::new();
    for &cost in costs {
        let wg = wg.clone();
        let mut job = Job::new(move || {
            spin(cost);
            drop(wg);
        });
        while let Err(PushError::Full(returned)) = pool.submit(job) {
            job = returned;
            thread::yield_now();
        }
    }
    wg.wait();
}

fn pool_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool");
    let mut rng = StdRng::seed_from_u64(7);
    let costs: Vec<u32> = (0..JOBS).map(|_| rng.gen_range(0..2000)).collect();

    for threads in [1, 2, 4, 8] {
        let pool = WorkerPool::new(256, threads).unwrap();
        group.bench_with_input(BenchmarkId::new("threads", threads), &costs, |b, costs| {
            b.iter(|| submit_all(&pool, costs));
        });
    }

    for capacity in [4, 64, 1024] {
        let pool = WorkerPool::new(capacity, 4).unwrap();
        group.bench_with_input(BenchmarkId::new("capacity", capacity), &costs, |b, costs| {
            b.iter(|| submit_all(&pool, costs));
        });
    }

    group.finish();
}

fn queue_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue");

    group.bench_function("push_pop", |b| {
        let queue = BoundedQueue::new(256).unwrap();
        b.iter(|| {
            for i in 0..256 {
                queue.push(black_box(i)).unwrap();
            }
            for _ in 0..256 {
                black_box(queue.pop());
            }
        });
    });

    group.bench_function("spsc_handoff", |b| {
        b.iter(|| {
            let queue = Arc::new(BoundedQueue::new(64).unwrap());
            let consumer = {
                let queue = Arc::clone(&queue);
                thread::spawn(move || while queue.pop().is_some() {})
            };
            for i in 0..JOBS {
                let mut item = i;
                while let Err(PushError::Full(returned)) = queue.push(item) {
                    item = returned;
                    thread::yield_now();
                }
            }
            queue.close();
            consumer.join().unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, pool_bench, queue_bench);
criterion_main!(benches);
