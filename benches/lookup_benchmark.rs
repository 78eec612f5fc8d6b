//! Benchmarks for feed parsing and cached lookups.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ip_whitelist::{feed, FeedRequest, FeedResponse, Processor, Transport, TransportError};
use std::io::Cursor;
use std::time::Duration;

const COUNTRIES: [&str; 8] = ["DE", "FR", "GB", "NL", "SE", "IT", "ES", "PL"];

/// Generate a synthetic feed with `records` IPv4 allocations plus noise.
fn generate_feed(records: usize) -> String {
    let mut feed = String::from("2|ripencc|20240101|0|19830705|20240101|+0100\n");
    feed.push_str("ripencc|*|ipv4|*|0|summary\n");

    for i in 0..records {
        let country = COUNTRIES[i % COUNTRIES.len()];
        let count = 256u64 << (i % 8);
        feed.push_str(&format!(
            "ripencc|{}|ipv4|{}.{}.0.0|{}|20240101|allocated|{}\n",
            country,
            (i / 256) % 224 + 1,
            i % 256,
            count,
            i
        ));
        if i % 10 == 0 {
            feed.push_str(&format!(
                "ripencc|{}|ipv6|2001:db8:{:x}::|32|20240101|allocated\n",
                country, i
            ));
        }
    }

    feed
}

struct StaticFeed(String);

impl Transport for StaticFeed {
    fn execute(&self, _request: &FeedRequest) -> Result<FeedResponse, TransportError> {
        Ok(FeedResponse {
            status: 200,
            body: Box::new(Cursor::new(self.0.clone().into_bytes())),
        })
    }
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("feed_parse");

    for records in [1_000, 10_000, 100_000] {
        let feed_data = generate_feed(records);
        group.throughput(Throughput::Bytes(feed_data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(records), &feed_data, |b, data| {
            b.iter(|| feed::parse(black_box(data.as_bytes())).unwrap())
        });
    }

    group.finish();
}

fn bench_cached_lookup(c: &mut Criterion) {
    let processor = Processor::new(StaticFeed(generate_feed(50_000)), Duration::from_secs(3600));
    processor.refresh().unwrap();

    let mut group = c.benchmark_group("cached_lookup");
    group.throughput(Throughput::Elements(1));

    group.bench_function("known_country", |b| {
        b.iter(|| processor.lookup(black_box("de")).unwrap())
    });

    group.bench_function("unknown_country", |b| {
        b.iter(|| processor.lookup(black_box("xx")).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_cached_lookup);
criterion_main!(benches);
