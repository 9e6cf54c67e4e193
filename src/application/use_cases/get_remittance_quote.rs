//! # Get Remittance Quote Use Case
//!
//! The request handling path in front of the aggregation engine.
//!
//! # Flow
//!
//! 1. Admit the caller through the [`RateLimiter`]
//! 2. Parse and validate the request into a [`Query`]
//! 3. Serve a live cache entry without touching any provider
//! 4. Otherwise aggregate, build the response and cache it
//!
//! Failures are never cached. Aggregation runs on its own task so a panic
//! inside the engine is reported as `ApplicationError::Internal` instead of
//! tearing down the request.

use crate::application::dto::{AggregatedResponse, QuoteRequest};
use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::quote_aggregation::QuoteAggregationEngine;
use crate::application::services::rate_limiter::RateLimiter;
use crate::application::services::result_cache::{CacheStats, ResultCache};
use crate::domain::entities::Query;
use crate::domain::value_objects::{CallerId, CurrencyCode};
use std::sync::Arc;

/// Cache of aggregated responses keyed by normalized query.
pub type QuoteCache = ResultCache<Query, Arc<AggregatedResponse>>;

/// Use case for fetching ranked remittance quotes.
#[derive(Debug)]
pub struct GetRemittanceQuoteUseCase {
    engine: Arc<QuoteAggregationEngine>,
    rate_limiter: Arc<RateLimiter>,
    cache: Arc<QuoteCache>,
}

impl GetRemittanceQuoteUseCase {
    /// Creates the use case.
    #[must_use]
    pub fn new(
        engine: Arc<QuoteAggregationEngine>,
        rate_limiter: Arc<RateLimiter>,
        cache: Arc<QuoteCache>,
    ) -> Self {
        Self {
            engine,
            rate_limiter,
            cache,
        }
    }

    /// Executes a quote request for `caller`.
    ///
    /// # Errors
    ///
    /// - `ApplicationError::RateLimited` if the caller is over its ceiling
    /// - `ApplicationError::Validation` if the request does not describe a
    ///   supported corridor
    /// - `ApplicationError::NoProvidersAvailable` or
    ///   `ApplicationError::RequestTimedOut` if aggregation produced nothing
    /// - `ApplicationError::Internal` if the aggregation task failed
    pub async fn execute(
        &self,
        caller: &CallerId,
        request: QuoteRequest,
    ) -> ApplicationResult<Arc<AggregatedResponse>> {
        self.rate_limiter.check(caller)?;

        let query = parse_request(&request)?;

        if let Some(cached) = self.cache.get(&query) {
            tracing::debug!(caller = %caller, query = %query, "cache hit");
            return Ok(cached);
        }

        let engine = Arc::clone(&self.engine);
        let task_query = query.clone();
        let result = tokio::spawn(async move { engine.aggregate(&task_query).await })
            .await
            .map_err(|e| {
                tracing::error!(query = %query, error = %e, "aggregation task failed");
                ApplicationError::internal(e.to_string())
            })??;

        let response = Arc::new(AggregatedResponse::from_ranked(&query, result.quotes));
        self.cache.put(query, Arc::clone(&response));
        Ok(response)
    }

    /// Drops idle rate-limit windows and expired cache entries.
    ///
    /// Returns `(callers_purged, entries_evicted)`.
    pub fn maintenance(&self) -> (usize, usize) {
        let purged = self.rate_limiter.purge_idle();
        let evicted = self.cache.evict_expired();
        if purged > 0 || evicted > 0 {
            tracing::debug!(purged, evicted, "maintenance sweep");
        }
        (purged, evicted)
    }

    /// Returns cache counters.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

fn parse_request(request: &QuoteRequest) -> ApplicationResult<Query> {
    let query = Query::parse(
        &request.receive_country,
        &request.receive_currency,
        request.send_amount,
    )?;

    match request.send_currency.as_deref() {
        None => Ok(query),
        Some(raw) => {
            let send_currency = CurrencyCode::new(raw)?;
            if send_currency != CurrencyCode::KRW {
                return Err(ApplicationError::validation(format!(
                    "unsupported send currency {}",
                    send_currency
                )));
            }
            Ok(query.with_send_currency(send_currency))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::application::services::ranking_strategy::RecipientGetsStrategy;
    use crate::application::services::rate_limiter::RateLimiterConfig;
    use crate::application::services::result_cache::ResultCacheConfig;
    use crate::application::services::quote_aggregation::AggregationConfig;
    use crate::domain::entities::Quote;
    use crate::domain::value_objects::ProviderId;
    use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
    use crate::infrastructure::providers::registry::InMemoryProviderRegistry;
    use crate::infrastructure::providers::traits::ProviderAdapter;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Debug)]
    struct CountingProvider {
        id: ProviderId,
        gets: Option<i64>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ProviderAdapter for CountingProvider {
        fn provider_id(&self) -> &ProviderId {
            &self.id
        }

        async fn quote(&self, _query: &Query) -> ProviderResult<Quote> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.gets {
                Some(gets) => Ok(Quote::new(
                    self.id.clone(),
                    Decimal::ONE,
                    Decimal::ZERO,
                    Decimal::from(gets),
                )?),
                None => Err(ProviderError::connection("down")),
            }
        }
    }

    #[derive(Debug)]
    struct PanickingProvider(ProviderId);

    #[async_trait]
    impl ProviderAdapter for PanickingProvider {
        fn provider_id(&self) -> &ProviderId {
            &self.0
        }

        async fn quote(&self, _query: &Query) -> ProviderResult<Quote> {
            panic!("adapter bug")
        }
    }

    fn use_case(
        providers: Vec<Arc<dyn ProviderAdapter>>,
        max_requests: usize,
    ) -> GetRemittanceQuoteUseCase {
        let engine = QuoteAggregationEngine::new(
            Arc::new(InMemoryProviderRegistry::with_providers(providers)),
            Arc::new(RecipientGetsStrategy),
            AggregationConfig::default(),
        );
        GetRemittanceQuoteUseCase::new(
            Arc::new(engine),
            Arc::new(RateLimiter::new(RateLimiterConfig::new(
                max_requests,
                Duration::from_secs(60),
            ))),
            Arc::new(ResultCache::new(ResultCacheConfig::default())),
        )
    }

    fn counting(id: &str, gets: Option<i64>, calls: &Arc<AtomicUsize>) -> Arc<dyn ProviderAdapter> {
        Arc::new(CountingProvider {
            id: ProviderId::new(id),
            gets,
            calls: Arc::clone(calls),
        })
    }

    fn caller() -> CallerId {
        CallerId::new("198.51.100.4")
    }

    #[tokio::test]
    async fn second_identical_request_is_served_from_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let use_case = use_case(
            vec![
                counting("A", Some(23_500_000), &calls),
                counting("B", Some(23_750_000), &calls),
                counting("C", None, &calls),
            ],
            15,
        );
        let request = QuoteRequest::new("vietnam", "VND", 1_000_000);

        let first = use_case.execute(&caller(), request.clone()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(first.results.len(), 2);
        assert_eq!(
            first.best_rate_provider.as_ref().unwrap().recipient_gets(),
            Decimal::from(23_750_000)
        );

        let second = use_case.execute(&caller(), request).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            serde_json::to_string(&*first).unwrap(),
            serde_json::to_string(&*second).unwrap()
        );
        assert_eq!(use_case.cache_stats().hits, 1);
    }

    #[tokio::test]
    async fn normalized_requests_share_a_cache_entry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let use_case = use_case(vec![counting("A", Some(10), &calls)], 15);

        use_case
            .execute(&caller(), QuoteRequest::new("Vietnam", "vnd", 500))
            .await
            .unwrap();
        use_case
            .execute(&caller(), QuoteRequest::new("vietnam", "VND", 500))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let use_case = use_case(vec![counting("A", None, &calls)], 15);
        let request = QuoteRequest::new("vietnam", "VND", 1000);

        for _ in 0..2 {
            assert_eq!(
                use_case.execute(&caller(), request.clone()).await.unwrap_err(),
                ApplicationError::NoProvidersAvailable
            );
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalid_requests_never_reach_providers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let use_case = use_case(vec![counting("A", Some(1), &calls)], 15);

        for request in [
            QuoteRequest::new("atlantis", "VND", 1000),
            QuoteRequest::new("vietnam", "EUR", 1000),
            QuoteRequest::new("vietnam", "VND", 0),
            QuoteRequest::new("vietnam", "VND", -5),
            QuoteRequest {
                send_currency: Some("USD".into()),
                ..QuoteRequest::new("vietnam", "VND", 1000)
            },
        ] {
            assert!(matches!(
                use_case.execute(&caller(), request).await,
                Err(ApplicationError::Validation(_))
            ));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn explicit_krw_is_accepted() {
        let calls = Arc::new(AtomicUsize::new(0));
        let use_case = use_case(vec![counting("A", Some(1), &calls)], 15);
        let request = QuoteRequest {
            send_currency: Some("krw".into()),
            ..QuoteRequest::new("nepal", "NPR", 1000)
        };
        let response = use_case.execute(&caller(), request).await.unwrap();
        assert_eq!(response.send_currency, "KRW");
    }

    #[tokio::test]
    async fn rate_limit_applies_before_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let use_case = use_case(vec![counting("A", Some(1), &calls)], 2);
        let request = QuoteRequest::new("vietnam", "VND", 1000);

        use_case.execute(&caller(), request.clone()).await.unwrap();
        use_case.execute(&caller(), request.clone()).await.unwrap();
        assert!(matches!(
            use_case.execute(&caller(), request).await,
            Err(ApplicationError::RateLimited { .. })
        ));
    }

    #[tokio::test]
    async fn panicking_adapter_is_isolated() {
        let adapter: Arc<dyn ProviderAdapter> = Arc::new(PanickingProvider(ProviderId::new("P")));
        let use_case = use_case(vec![adapter], 15);
        let err = use_case
            .execute(&caller(), QuoteRequest::new("vietnam", "VND", 1000))
            .await
            .unwrap_err();
        assert_eq!(err, ApplicationError::NoProvidersAvailable);
    }

    #[tokio::test(start_paused = true)]
    async fn maintenance_sweeps_both_stores() {
        let calls = Arc::new(AtomicUsize::new(0));
        let use_case = use_case(vec![counting("A", Some(1), &calls)], 15);
        use_case
            .execute(&caller(), QuoteRequest::new("vietnam", "VND", 1000))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(use_case.maintenance(), (1, 1));
    }
}
