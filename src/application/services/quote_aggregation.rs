//! # Quote Aggregation Engine
//!
//! Fans a query out to every registered provider and merges the answers.
//!
//! Two deadlines bound the work:
//!
//! - a per-provider deadline around each adapter call; an adapter that
//!   overruns it is cancelled and counted as a failure
//! - a global deadline around the whole collection; tasks still running
//!   when it fires are aborted and their results discarded
//!
//! The per-provider deadline is always strictly shorter than the global one;
//! [`QuoteAggregationEngine::new`] clamps a configuration that says
//! otherwise. The global deadline therefore only decides the outcome when an
//! adapter does not yield to cancellation.
//!
//! Provider failures never fail the aggregation. It fails only when no
//! quote was collected: with `RequestTimedOut` if the global deadline cut
//! collection short, otherwise with `NoProvidersAvailable`.

use crate::application::error::ApplicationError;
use crate::application::services::ranking_strategy::RankingStrategy;
use crate::domain::entities::{Query, Quote};
use crate::domain::value_objects::ProviderId;
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use crate::infrastructure::providers::traits::ProviderRegistry;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{Instant, timeout, timeout_at};

const DEFAULT_TIMEOUT_MS: u64 = 3000;
const DEFAULT_PER_PROVIDER_TIMEOUT_MS: u64 = 2000;

/// Configuration for quote aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationConfig {
    /// Global deadline in milliseconds.
    pub timeout_ms: u64,
    /// Per-provider deadline in milliseconds; shorter than `timeout_ms`.
    pub per_provider_timeout_ms: u64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            per_provider_timeout_ms: DEFAULT_PER_PROVIDER_TIMEOUT_MS,
        }
    }
}

impl AggregationConfig {
    /// Creates a configuration with the given global deadline.
    ///
    /// The per-provider deadline is the default, capped at two thirds of
    /// `timeout_ms`.
    #[must_use]
    pub fn with_timeout(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            per_provider_timeout_ms: DEFAULT_PER_PROVIDER_TIMEOUT_MS
                .min(two_thirds(timeout_ms)),
        }
    }

    /// Sets the per-provider deadline.
    #[must_use]
    pub fn with_per_provider_timeout(mut self, timeout_ms: u64) -> Self {
        self.per_provider_timeout_ms = timeout_ms;
        self
    }

    /// Returns this configuration with the per-provider deadline strictly
    /// below the global one.
    #[must_use]
    pub fn clamped(self) -> Self {
        if self.per_provider_timeout_ms < self.timeout_ms {
            return self;
        }
        Self {
            per_provider_timeout_ms: two_thirds(self.timeout_ms),
            ..self
        }
    }

    /// Returns the global deadline.
    #[must_use]
    pub fn global_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Returns the per-provider deadline.
    #[must_use]
    pub fn per_provider_timeout(&self) -> Duration {
        Duration::from_millis(self.per_provider_timeout_ms)
    }
}

fn two_thirds(ms: u64) -> u64 {
    ms.saturating_mul(2) / 3
}

/// Successful result of an aggregation.
#[derive(Debug, Clone)]
pub struct AggregationResult {
    /// Ranked quotes, best first. Never empty.
    pub quotes: Vec<Quote>,
    /// Number of providers queried.
    pub providers_queried: usize,
    /// Number of providers that failed or were cancelled.
    pub providers_failed: usize,
    /// Whether the global deadline cut collection short.
    pub deadline_hit: bool,
}

impl AggregationResult {
    /// Returns the best quote.
    #[must_use]
    pub fn best_quote(&self) -> Option<&Quote> {
        self.quotes.first()
    }
}

/// Error type for aggregation operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationError {
    /// No provider produced a quote.
    NoProvidersAvailable,
    /// The global deadline elapsed before any quote arrived.
    RequestTimedOut,
}

impl fmt::Display for AggregationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoProvidersAvailable => write!(f, "no providers available"),
            Self::RequestTimedOut => write!(f, "quote collection timed out"),
        }
    }
}

impl std::error::Error for AggregationError {}

impl From<AggregationError> for ApplicationError {
    fn from(error: AggregationError) -> Self {
        match error {
            AggregationError::NoProvidersAvailable => Self::NoProvidersAvailable,
            AggregationError::RequestTimedOut => Self::RequestTimedOut,
        }
    }
}

/// Result type for aggregation operations.
pub type AggregationResultType<T> = Result<T, AggregationError>;

/// Engine for collecting and ranking quotes from every provider.
#[derive(Debug)]
pub struct QuoteAggregationEngine {
    registry: Arc<dyn ProviderRegistry>,
    ranking_strategy: Arc<dyn RankingStrategy>,
    config: AggregationConfig,
}

impl QuoteAggregationEngine {
    /// Creates a new engine.
    ///
    /// A per-provider deadline at or above the global deadline is clamped,
    /// see [`AggregationConfig::clamped`].
    #[must_use]
    pub fn new(
        registry: Arc<dyn ProviderRegistry>,
        ranking_strategy: Arc<dyn RankingStrategy>,
        config: AggregationConfig,
    ) -> Self {
        let clamped = config.clamped();
        if clamped != config {
            tracing::warn!(
                global_ms = config.timeout_ms,
                requested_ms = config.per_provider_timeout_ms,
                per_provider_ms = clamped.per_provider_timeout_ms,
                "per-provider deadline clamped below global deadline"
            );
        }
        let config = clamped;
        Self {
            registry,
            ranking_strategy,
            config,
        }
    }

    /// Creates a new engine with default configuration.
    #[must_use]
    pub fn with_defaults(
        registry: Arc<dyn ProviderRegistry>,
        ranking_strategy: Arc<dyn RankingStrategy>,
    ) -> Self {
        Self::new(registry, ranking_strategy, AggregationConfig::default())
    }

    /// Collects quotes from every provider and ranks them.
    ///
    /// # Errors
    ///
    /// Returns `AggregationError::RequestTimedOut` if the global deadline
    /// elapsed with no quote collected, and
    /// `AggregationError::NoProvidersAvailable` if every provider finished
    /// without a quote or none is registered.
    pub async fn aggregate(&self, query: &Query) -> AggregationResultType<AggregationResult> {
        let providers = self.registry.available_providers().await;
        let providers_queried = providers.len();
        if providers.is_empty() {
            tracing::warn!(query = %query, "no providers registered");
            return Err(AggregationError::NoProvidersAvailable);
        }

        let deadline = Instant::now() + self.config.global_timeout();
        let per_provider = self.config.per_provider_timeout();

        let mut tasks = JoinSet::new();
        for provider in providers {
            let query = query.clone();
            tasks.spawn(async move {
                let id = provider.provider_id().clone();
                let outcome = match timeout(per_provider, provider.quote(&query)).await {
                    Ok(result) => result,
                    Err(_) => Err(ProviderError::timeout(format!(
                        "no response after {}ms",
                        per_provider.as_millis()
                    ))),
                };
                (id, outcome)
            });
        }

        let mut quotes = Vec::with_capacity(providers_queried);
        let mut providers_failed = 0;
        let mut deadline_hit = false;

        loop {
            match timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((id, outcome)))) => {
                    if let Some(quote) = accept(&id, outcome) {
                        quotes.push(quote);
                    } else {
                        providers_failed += 1;
                    }
                }
                Ok(Some(Err(join_error))) => {
                    providers_failed += 1;
                    tracing::warn!(error = %join_error, "provider task aborted");
                }
                Ok(None) => break,
                Err(_) => {
                    deadline_hit = true;
                    let abandoned = tasks.len();
                    providers_failed += abandoned;
                    tasks.abort_all();
                    tracing::warn!(
                        query = %query,
                        abandoned,
                        collected = quotes.len(),
                        "global deadline reached"
                    );
                    break;
                }
            }
        }

        let quotes = self.ranking_strategy.rank(quotes);
        if quotes.is_empty() {
            return Err(if deadline_hit {
                AggregationError::RequestTimedOut
            } else {
                AggregationError::NoProvidersAvailable
            });
        }

        tracing::info!(
            query = %query,
            collected = quotes.len(),
            providers_queried,
            providers_failed,
            "aggregation complete"
        );

        Ok(AggregationResult {
            quotes,
            providers_queried,
            providers_failed,
            deadline_hit,
        })
    }

    /// Returns the current configuration.
    #[must_use]
    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Returns the ranking strategy name.
    #[must_use]
    pub fn ranking_strategy_name(&self) -> &'static str {
        self.ranking_strategy.name()
    }
}

fn accept(id: &ProviderId, outcome: ProviderResult<Quote>) -> Option<Quote> {
    match outcome {
        Ok(quote) => {
            tracing::debug!(provider = %id, recipient_gets = %quote.recipient_gets(), "quote received");
            Some(quote)
        }
        Err(ProviderError::UnsupportedCorridor { corridor }) => {
            tracing::debug!(provider = %id, %corridor, "corridor not served");
            None
        }
        Err(error) => {
            tracing::warn!(provider = %id, error = %error, "provider failed");
            None
        }
    }
}
