use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::collections::{BTreeMap, BTreeSet};
use twig_tree::{BstMap, BstMultimap, BstSet};

// Keys are pseudo-random throughout: the tree does not rebalance, so
// monotonic insertion degenerates to a linked list and measures nothing
// but that worst case.
const N: usize = 10_000;

// ─── Helper functions to generate key sequences ─────────────────────────────

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

/// Random keys folded into a narrow range so most keys repeat many times.
fn duplicate_keys(n: usize) -> Vec<i64> {
    random_keys(n).into_iter().map(|k| k % 256).collect()
}

// ─── Map Benchmarks ─────────────────────────────────────────────────────────

fn bench_map_insert_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("map_insert_random");

    group.bench_function(BenchmarkId::new("BstMap", N), |b| {
        b.iter(|| {
            let mut map = BstMap::new();
            for &k in &keys {
                map.insert(k, k);
            }
            map
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for &k in &keys {
                map.insert(k, k);
            }
            map
        });
    });

    group.finish();
}

fn bench_map_get_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let bst_map: BstMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();
    let bt_map: BTreeMap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

    let mut group = c.benchmark_group("map_get_random");

    group.bench_function(BenchmarkId::new("BstMap", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for &k in &keys {
                if let Ok(&v) = bst_map.get(&k) {
                    sum = sum.wrapping_add(v);
                }
            }
            sum
        });
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for &k in &keys {
                if let Some(&v) = bt_map.get(&k) {
                    sum = sum.wrapping_add(v);
                }
            }
            sum
        });
    });

    group.finish();
}

fn bench_map_remove_random(c: &mut Criterion) {
    let keys = random_keys(N);

    let mut group = c.benchmark_group("map_remove_random");

    group.bench_function(BenchmarkId::new("BstMap", N), |b| {
        b.iter_batched(
            || keys.iter().map(|&k| (k, k)).collect::<BstMap<i64, i64>>(),
            |mut map| {
                for &k in &keys {
                    map.remove(&k);
                }
                map
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function(BenchmarkId::new("BTreeMap", N), |b| {
        b.iter_batched(
            || keys.iter().map(|&k| (k, k)).collect::<BTreeMap<i64, i64>>(),
            |mut map| {
                for &k in &keys {
                    map.remove(&k);
                }
                map
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ─── Multimap Benchmarks ────────────────────────────────────────────────────

fn bench_multimap_insert_duplicates(c: &mut Criterion) {
    let keys = duplicate_keys(N);
    let mut group = c.benchmark_group("multimap_insert_duplicates");

    group.bench_function(BenchmarkId::new("BstMultimap", N), |b| {
        b.iter(|| {
            let mut multimap = BstMultimap::new();
            for &k in &keys {
                multimap.insert(k, k);
            }
            multimap
        });
    });

    group.finish();
}

fn bench_multimap_equal_range(c: &mut Criterion) {
    let keys = duplicate_keys(N);
    let multimap: BstMultimap<i64, i64> = keys.iter().map(|&k| (k, k)).collect();

    let mut group = c.benchmark_group("multimap_equal_range");

    group.bench_function(BenchmarkId::new("BstMultimap", N), |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for &k in &keys {
                for (_, &v) in multimap.equal_range(&k) {
                    sum = sum.wrapping_add(v);
                }
            }
            sum
        });
    });

    group.finish();
}

fn bench_multimap_remove_all(c: &mut Criterion) {
    let keys = duplicate_keys(N);

    let mut group = c.benchmark_group("multimap_remove_all");

    group.bench_function(BenchmarkId::new("BstMultimap", N), |b| {
        b.iter_batched(
            || keys.iter().map(|&k| (k, k)).collect::<BstMultimap<i64, i64>>(),
            |mut multimap| {
                for &k in &keys {
                    multimap.remove_all(&k);
                }
                multimap
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ─── Set Benchmarks ─────────────────────────────────────────────────────────

fn bench_set_insert_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("set_insert_random");

    group.bench_function(BenchmarkId::new("BstSet", N), |b| {
        b.iter(|| {
            let mut set = BstSet::new();
            for &k in &keys {
                set.insert(k);
            }
            set
        });
    });

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter(|| {
            let mut set = BTreeSet::new();
            for &k in &keys {
                set.insert(k);
            }
            set
        });
    });

    group.finish();
}

fn bench_set_contains_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let bst_set: BstSet<i64> = keys.iter().copied().collect();
    let bt_set: BTreeSet<i64> = keys.iter().copied().collect();

    let mut group = c.benchmark_group("set_contains_random");

    group.bench_function(BenchmarkId::new("BstSet", N), |b| {
        b.iter(|| {
            let mut count = 0usize;
            for &k in &keys {
                if bst_set.contains(&k) {
                    count += 1;
                }
            }
            count
        });
    });

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter(|| {
            let mut count = 0usize;
            for &k in &keys {
                if bt_set.contains(&k) {
                    count += 1;
                }
            }
            count
        });
    });

    group.finish();
}

fn bench_set_remove_random(c: &mut Criterion) {
    let keys = random_keys(N);

    let mut group = c.benchmark_group("set_remove_random");

    group.bench_function(BenchmarkId::new("BstSet", N), |b| {
        b.iter_batched(
            || keys.iter().copied().collect::<BstSet<i64>>(),
            |mut set| {
                for &k in &keys {
                    set.remove(&k);
                }
                set
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.bench_function(BenchmarkId::new("BTreeSet", N), |b| {
        b.iter_batched(
            || keys.iter().copied().collect::<BTreeSet<i64>>(),
            |mut set| {
                for &k in &keys {
                    set.remove(&k);
                }
                set
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ─── Criterion Groups ───────────────────────────────────────────────────────

criterion_group!(map_benches, bench_map_insert_random, bench_map_get_random, bench_map_remove_random,);

criterion_group!(
    multimap_benches,
    bench_multimap_insert_duplicates,
    bench_multimap_equal_range,
    bench_multimap_remove_all,
);

criterion_group!(set_benches, bench_set_insert_random, bench_set_contains_random, bench_set_remove_random,);

criterion_main!(map_benches, multimap_benches, set_benches);
