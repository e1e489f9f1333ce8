use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hdindex::{FixedHash, HDIndex, MemoryBlockstore, Vector};

pub fn generate_random_key() -> FixedHash {
    FixedHash::new(rand::random())
}

fn setup_index(num_leaves: usize) -> (HDIndex<MemoryBlockstore>, Vec<FixedHash>) {
    let mut index = HDIndex::from_store(MemoryBlockstore::new());
    let mut keys = Vec::with_capacity(num_leaves);

    for _ in 0..num_leaves {
        let key = generate_random_key();
        index.set(&key, &rand::random::<u64>()).unwrap();
        keys.push(key);
    }

    (index, keys)
}

fn bench_proof_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("HDIndex Proof Generation");

    let (index, keys) = setup_index(100);

    group.bench_function("Membership", |b| {
        b.iter(|| {
            for key in &keys {
                black_box(index.proof(key)).unwrap();
            }
        })
    });

    let absent: Vec<_> = (0..100).map(|_| generate_random_key()).collect();
    group.bench_function("Non-membership", |b| {
        b.iter(|| {
            for key in &absent {
                black_box(index.proof(key)).unwrap();
            }
        })
    });

    group.finish();
}

fn bench_proof_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("HDIndex Proof Verification");

    let (index, keys) = setup_index(100);
    let root = index.root();

    // Proofs travel as bytes, so each verification starts from a fresh vector
    let proofs: Vec<_> = keys
        .iter()
        .map(|key| index.proof(key).unwrap().to_bytes())
        .collect();

    group.bench_function("Membership", |b| {
        b.iter(|| {
            for (key, proof) in keys.iter().zip(proofs.iter()) {
                let vector = Vector::from_bytes(proof).unwrap();
                assert!(black_box(vector.verify(&root, Some(key), None)));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_proof_generation, bench_proof_verification);
criterion_main!(benches);
