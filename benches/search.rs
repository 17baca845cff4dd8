use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use once_cell::sync::Lazy;
use rand::Rng;

use hopscotch_hash::HopscotchMap;

const TOTAL_KEYS: u64 = 50_000;
const LOOKUPS: u64 = 10_000;

static MAP: Lazy<HopscotchMap<u64, u64>> = Lazy::new(|| {
    let mut map = HopscotchMap::with_capacity(TOTAL_KEYS as usize);
    for k in 0..TOTAL_KEYS {
        map.insert(k, k);
    }
    map
});

static HITS: Lazy<Vec<u64>> = Lazy::new(|| {
    let mut rng = rand::thread_rng();
    (0..LOOKUPS).map(|_| rng.gen_range(0, TOTAL_KEYS)).collect()
});

static MISSES: Lazy<Vec<u64>> = Lazy::new(|| {
    (0..LOOKUPS).map(|i| TOTAL_KEYS + i).collect()
});

fn find_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("find");
    group.throughput(Throughput::Elements(LOOKUPS));
    group.bench_with_input(BenchmarkId::new("hit", TOTAL_KEYS), &TOTAL_KEYS, |b, _| {
        b.iter(|| {
            for &k in HITS.iter() {
                black_box(MAP.get(&k));
            }
        });
    });
    group.bench_with_input(BenchmarkId::new("miss", TOTAL_KEYS), &TOTAL_KEYS, |b, _| {
        b.iter(|| {
            for &k in MISSES.iter() {
                black_box(MAP.get(&k));
            }
        });
    });
    group.finish();
}

criterion_group!(benches, find_hit);
criterion_main!(benches);
