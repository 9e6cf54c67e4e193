//! Benchmarks for the aggregation hot path.
//!
//! Fake adapters answer immediately, so the numbers measure fan-out,
//! collection, ranking and cache overhead only.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use remit_quote::application::services::{
    QuoteAggregationEngine, RankingStrategy, RecipientGetsStrategy, ResultCache,
    ResultCacheConfig,
};
use remit_quote::domain::entities::{Query, Quote};
use remit_quote::domain::value_objects::ProviderId;
use remit_quote::infrastructure::providers::{
    InMemoryProviderRegistry, ProviderAdapter, ProviderResult,
};
use rust_decimal::Decimal;
use std::hint::black_box;
use std::sync::Arc;

#[derive(Debug)]
struct InstantProvider {
    id: ProviderId,
    gets: i64,
}

#[async_trait]
impl ProviderAdapter for InstantProvider {
    fn provider_id(&self) -> &ProviderId {
        &self.id
    }

    async fn quote(&self, _query: &Query) -> ProviderResult<Quote> {
        Ok(Quote::new(
            self.id.clone(),
            Decimal::ONE,
            Decimal::ZERO,
            Decimal::from(self.gets),
        )?)
    }
}

fn engine(providers: usize) -> QuoteAggregationEngine {
    let adapters: Vec<Arc<dyn ProviderAdapter>> = (0..providers)
        .map(|i| {
            Arc::new(InstantProvider {
                id: ProviderId::new(format!("P{i}")),
                gets: 1_000 + (i as i64 * 7919) % 1_000,
            }) as Arc<dyn ProviderAdapter>
        })
        .collect();
    QuoteAggregationEngine::with_defaults(
        Arc::new(InMemoryProviderRegistry::with_providers(adapters)),
        Arc::new(RecipientGetsStrategy),
    )
}

fn bench_aggregate(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let query = Query::parse("vietnam", "VND", 1_000_000).unwrap();

    let mut group = c.benchmark_group("aggregate");
    for providers in [4usize, 12, 32] {
        let engine = engine(providers);
        group.bench_with_input(BenchmarkId::from_parameter(providers), &providers, |b, _| {
            b.to_async(&rt)
                .iter(|| async { black_box(engine.aggregate(&query).await.unwrap()) });
        });
    }
    group.finish();
}

fn bench_rank(c: &mut Criterion) {
    let quotes: Vec<Quote> = (0..12)
        .map(|i| {
            Quote::new(
                ProviderId::new(format!("P{i}")),
                Decimal::ONE,
                Decimal::ZERO,
                Decimal::from(1_000 + (i * 37) % 11),
            )
            .unwrap()
        })
        .collect();

    c.bench_function("rank_12_quotes", |b| {
        b.iter(|| black_box(RecipientGetsStrategy.rank(quotes.clone())));
    });
}

fn bench_cache_hit(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let _guard = rt.enter();
    let cache: ResultCache<Query, Arc<Vec<u8>>> = ResultCache::new(ResultCacheConfig::default());
    let query = Query::parse("vietnam", "VND", 1_000_000).unwrap();
    cache.put(query.clone(), Arc::new(vec![0; 512]));

    c.bench_function("cache_hit", |b| {
        b.iter(|| black_box(cache.get(&query)));
    });
}

criterion_group!(benches, bench_aggregate, bench_rank, bench_cache_hit);
criterion_main!(benches);
