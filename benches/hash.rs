use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use once_cell::sync::Lazy;
use rand::Rng;

use hopscotch_hash::HopscotchMap;

const CAPACITY: [usize; 3] = [512, 4096, 65536];
const TOTAL_KEYS: u64 = 10_000;

static KEYS: Lazy<Vec<u64>> = Lazy::new(|| {
    let mut rng = rand::thread_rng();
    (0..TOTAL_KEYS).map(|_| rng.gen_range(0, u64::MAX)).collect()
});

fn insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for cap in CAPACITY {
        group.throughput(Throughput::Elements(TOTAL_KEYS));
        group.bench_with_input(BenchmarkId::from_parameter(cap), &cap, |b, &cap| {
            b.iter(|| {
                let mut map: HopscotchMap<u64, u64> = HopscotchMap::with_capacity(cap);
                for &k in KEYS.iter() {
                    map.insert(black_box(k), k);
                }
                map
            });
        });
    }
    group.finish();
}

fn insert_or_assign(c: &mut Criterion) {
    let mut map: HopscotchMap<u64, u64> = HopscotchMap::with_capacity(TOTAL_KEYS as usize);
    for &k in KEYS.iter() {
        map.insert(k, k);
    }
    c.bench_function("insert_or_assign_existing", |b| {
        b.iter(|| {
            for &k in KEYS.iter() {
                map.insert(black_box(k), k + 1);
            }
        });
    });
}

criterion_group!(benches, insert, insert_or_assign);
criterion_main!(benches);
