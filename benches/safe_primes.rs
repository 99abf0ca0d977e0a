use criterion::{criterion_group, criterion_main, Criterion};

use hcs::number_util::random_safe_prime;
use hcs::rand_source::RandomSource;

pub fn safe_primes(c: &mut Criterion) {
    let mut r = RandomSource::new_with_seed(42);

    let mut g = c.benchmark_group("safe-primes-group");
    g.sample_size(10);
    g.bench_function("random_safe_prime/512", |b| {
        b.iter(|| random_safe_prime(&mut r, 512));
    });
}

pub fn threshold_key_generation(c: &mut Criterion) {
    let mut r = RandomSource::new_with_seed(42);

    let mut g = c.benchmark_group("threshold-keygen-group");
    g.sample_size(10);
    g.bench_function("generate_key_pair/512,w=3,l=5", |b| {
        b.iter(|| hcs::threshold::generate_key_pair(&mut r, 512, 3, 5).unwrap());
    });
}

criterion_group!(benches, safe_primes, threshold_key_generation);
criterion_main!(benches);
