use std::num::NonZeroUsize;

use criterion::{criterion_group, criterion_main, Criterion};
use hdindex::{Dag, FixedHash, Forest, HDIndex, MemoryBlockstore};

pub fn generate_random_key() -> FixedHash {
    FixedHash::new(rand::random())
}

fn bench_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("HDIndex Insertion");

    group.bench_function("Uncached", |b| {
        b.iter(|| {
            let mut index = HDIndex::from_store(MemoryBlockstore::new());
            for _ in 0..100 {
                let key = generate_random_key();
                index.set(&key, &rand::random::<u64>()).unwrap();
            }
        })
    });

    group.bench_function("Cached", |b| {
        b.iter(|| {
            let dag = Dag::with_cache(MemoryBlockstore::new(), NonZeroUsize::new(256).unwrap());
            let mut index = HDIndex::new(Forest::new(dag));
            for _ in 0..100 {
                let key = generate_random_key();
                index.set(&key, &rand::random::<u64>()).unwrap();
            }
        })
    });

    group.finish();
}

fn bench_deletion(c: &mut Criterion) {
    let mut group = c.benchmark_group("HDIndex Deletion");

    group.bench_function("Delete All", |b| {
        b.iter(|| {
            let mut index = HDIndex::from_store(MemoryBlockstore::new());
            let keys: Vec<_> = (0..100).map(|_| generate_random_key()).collect();
            for key in &keys {
                index.set(key, "value").unwrap();
            }
            for key in &keys {
                index.delete(key).unwrap();
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_insertion, bench_deletion);
criterion_main!(benches);
