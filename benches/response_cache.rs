//! 响应缓存与流水线基准测试

use bytes::Bytes;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use ipgeo::cache::{CachePolicy, ResponseCache, create_response_cache};
use ipgeo::codec::Codec;
use ipgeo::pipeline::LookupPipeline;
use ipgeo::pool::BufferPool;
use ipgeo::services::geoip::{GeoLocation, StaticOracle};
use std::hint::black_box;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

const HOUR: Duration = Duration::from_secs(3600);

fn policies() -> Vec<(&'static str, CachePolicy)> {
    vec![
        (
            "ttl",
            CachePolicy::Ttl {
                ttl: HOUR,
                cleanup_interval: HOUR,
            },
        ),
        (
            "size",
            CachePolicy::SizeBound {
                max_bytes: 64 * 1024 * 1024,
                ttl: HOUR,
                cleanup_interval: HOUR,
                shards: 256,
            },
        ),
    ]
}

fn keys(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("10.{}.{}.{}", (i >> 16) & 0xff, (i >> 8) & 0xff, i & 0xff))
        .collect()
}

// ============== 缓存读写 ==============

fn bench_cache_get(c: &mut Criterion) {
    let keys = keys(10_000);
    let value = Bytes::from_static(
        br#"{"country":{"iso_code":"SE"},"location":{"latitude":58.4167,"longitude":15.6167,"accuracy_radius":76}}"#,
    );

    let mut group = c.benchmark_group("cache/get_hit");
    group.throughput(Throughput::Elements(1));
    for (name, policy) in policies() {
        let cache: Arc<dyn ResponseCache> = create_response_cache(&policy).unwrap();
        for key in &keys {
            cache.put(key, value.clone());
        }
        let mut i = 0usize;
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                i = (i + 1) % keys.len();
                black_box(cache.get(&keys[i]))
            });
        });
        cache.close();
    }
    group.finish();
}

fn bench_cache_put(c: &mut Criterion) {
    let keys = keys(100_000);
    let value = Bytes::from(vec![b'x'; 100]);

    let mut group = c.benchmark_group("cache/put");
    group.throughput(Throughput::Elements(1));
    for (name, policy) in policies() {
        let cache = create_response_cache(&policy).unwrap();
        let mut i = 0usize;
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| {
                i = (i + 1) % keys.len();
                cache.put(&keys[i], value.clone());
            });
        });
        cache.close();
    }
    group.finish();
}

// ============== 流水线 ==============

fn bench_pipeline(c: &mut Criterion) {
    let ip: IpAddr = "2001:218:85a3::8a2e:370:7334".parse().unwrap();
    let oracle = Arc::new(
        StaticOracle::new().with_record(ip, GeoLocation::new("JP", 35.68536, 139.75309, 100)),
    );
    let pool = Arc::new(BufferPool::default());

    let mut group = c.benchmark_group("pipeline/handle");
    group.throughput(Throughput::Elements(1));

    let uncached = LookupPipeline::new(oracle.clone(), None, Arc::clone(&pool), Codec::Specialized);
    group.bench_function("uncached", |b| {
        b.iter(|| black_box(uncached.handle("2001:218:85a3::8a2e:370:7334").unwrap()));
    });

    for (name, policy) in policies() {
        let cache = create_response_cache(&policy);
        let pipeline =
            LookupPipeline::new(oracle.clone(), cache.clone(), Arc::clone(&pool), Codec::Specialized);
        group.bench_function(BenchmarkId::new("cached", name), |b| {
            b.iter(|| black_box(pipeline.handle("2001:218:85a3::8a2e:370:7334").unwrap()));
        });
        if let Some(cache) = cache {
            cache.close();
        }
    }

    group.finish();
}

criterion_group!(benches, bench_cache_get, bench_cache_put, bench_pipeline);
criterion_main!(benches);
