/// Route-table shaped benchmarks: random IPv4 prefixes, mostly /24 with a tail of shorter ones,
/// the way a full BGP table looks. Here to quickly test for regressions.
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::seq::SliceRandom;
use rand::Rng;

use patricia::{ArrayKey, Config, PatriciaTrie};

// Variations on the number of routes in the table for benchmarks that measure lookups
const TABLE_SIZES: [usize; 3] = [1 << 12, 1 << 16, 1 << 19];

type Route = (ArrayKey<4>, usize);

fn gen_routes(count: usize) -> Vec<Route> {
    let mut rng = rand::rng();
    let mut routes: Vec<Route> = (0..count)
        .map(|_| {
            let len = match rng.random_range(0..100) {
                0..=59 => 24,
                60..=79 => rng.random_range(16..24),
                80..=94 => rng.random_range(8..16),
                _ => rng.random_range(25..=32),
            };
            let addr: u32 = rng.random();
            let masked = addr & (u32::MAX << (32 - len));
            (ArrayKey::from(Ipv4Addr::from(masked)), len)
        })
        .collect();
    routes.sort_by_key(|(k, len)| (*k.as_array(), *len));
    routes.dedup();
    routes.shuffle(&mut rng);
    routes
}

fn build_table(routes: &[Route]) -> PatriciaTrie<usize> {
    let config = Config::ipv4().with_initial_capacity(routes.len() * 2);
    let mut table = PatriciaTrie::with_config(config).unwrap();
    for (i, (key, len)) in routes.iter().enumerate() {
        table.insert(key, *len, i).unwrap();
    }
    table
}

pub fn rand_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("rand_insert");
    group.throughput(Throughput::Elements(1));

    let routes = gen_routes(1 << 16);
    group.bench_function("replace", |b| {
        let mut table = PatriciaTrie::new();
        let mut rng = rand::rng();
        b.iter(|| {
            let (key, len) = &routes[rng.random_range(0..routes.len())];
            criterion::black_box(table.replace(key, *len, *len).unwrap());
        })
    });

    group.bench_function("fresh_table", |b| {
        b.iter_custom(|iters| {
            let mut elapsed = Duration::ZERO;
            let mut done = 0;
            while done < iters {
                let mut table = PatriciaTrie::new();
                let start = Instant::now();
                for (key, len) in routes.iter().take((iters - done) as usize) {
                    table.insert(key, *len, ()).unwrap();
                    done += 1;
                }
                elapsed += start.elapsed();
            }
            elapsed
        })
    });

    group.finish();
}

pub fn rand_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("rand_remove");
    group.throughput(Throughput::Elements(1));

    let routes = gen_routes(1 << 16);
    group.bench_function("remove_reinsert", |b| {
        let mut table = build_table(&routes);
        let mut rng = rand::rng();
        b.iter(|| {
            let (key, len) = &routes[rng.random_range(0..routes.len())];
            let value = table.remove(key, *len).unwrap();
            table.insert(key, *len, value).unwrap();
        })
    });

    group.finish();
}

pub fn rand_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("rand_lookup");
    group.throughput(Throughput::Elements(1));

    for size in TABLE_SIZES {
        let routes = gen_routes(size);
        let table = build_table(&routes);

        group.bench_with_input(BenchmarkId::new("longest_match", size), &size, |b, _size| {
            let mut rng = rand::rng();
            b.iter(|| {
                let addr: u32 = rng.random();
                criterion::black_box(table.lookup(ArrayKey::<4>::from(addr)));
            })
        });

        group.bench_with_input(BenchmarkId::new("exact", size), &size, |b, _size| {
            let mut rng = rand::rng();
            b.iter(|| {
                let (key, len) = &routes[rng.random_range(0..routes.len())];
                criterion::black_box(table.get(key, *len));
            })
        });
    }

    group.finish();
}

// One entry every 8 bits of a long all-ones key. Lookup time should grow linearly with depth.
pub fn nested_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested_lookup");
    for depth in [256usize, 1024, 4096] {
        let key = vec![0xFFu8; depth];
        let mut table = PatriciaTrie::new();
        for len in (8..=depth * 8).step_by(8) {
            table.insert(&key, len, len).unwrap();
        }
        group.throughput(Throughput::Bytes(depth as u64));
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _depth| {
            b.iter(|| criterion::black_box(table.lookup(&key)));
        });
    }
    group.finish();
}

criterion_group!(rand_benches, rand_insert, rand_remove, rand_lookup);
criterion_group!(nested_benches, nested_lookup);
criterion_main!(rand_benches, nested_benches);
