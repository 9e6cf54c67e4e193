//! # Proxy Pool
//!
//! Load-balances and health-manages a set of egress proxies.
//!
//! Providers call [`ProxyPool::acquire`] before an outbound request. The
//! returned [`ProxyLease`] must be completed with the outcome; dropping it
//! uncompleted (for example when the request future is cancelled by a
//! deadline) records a failure. When no proxy is eligible, `acquire`
//! returns `None` and the caller goes direct.
//!
//! # Selection
//!
//! A proxy is eligible when it is not quarantined, has spare concurrency
//! and has made fewer than `rate_per_minute` requests in the trailing
//! window. Among eligible proxies the lowest [`ProxyScore`] wins; see its
//! ordering for the tie-break contract.
//!
//! # Examples
//!
//! ```
//! use remit_quote::domain::entities::ProxyRecord;
//! use remit_quote::infrastructure::proxy::ProxyPool;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let pool = Arc::new(ProxyPool::with_defaults());
//! pool.add_proxy(ProxyRecord::new("10.0.0.1", 8080));
//!
//! if let Some(lease) = pool.acquire() {
//!     // ... perform the request through lease.record() ...
//!     lease.complete(true);
//! }
//! # }
//! ```

use crate::domain::entities::ProxyRecord;
use crate::domain::value_objects::{ProxyId, Timestamp};
use crate::infrastructure::proxy::probe::{ProxyProbe, ReqwestProbe};
use parking_lot::Mutex;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Default quarantine period after sustained failures.
pub const DEFAULT_QUARANTINE: Duration = Duration::from_secs(5 * 60);

/// Default minimum number of requests before quarantine can trigger.
pub const DEFAULT_MIN_SAMPLE_SIZE: u64 = 10;

/// Default failure rate above which a proxy is quarantined.
pub const DEFAULT_FAILURE_THRESHOLD: f64 = 0.5;

/// Trailing window used for the per-proxy request rate.
pub const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Tuning knobs for the proxy pool.
#[derive(Debug, Clone)]
pub struct ProxyPoolConfig {
    /// How long a failing proxy is excluded from selection.
    pub quarantine: Duration,
    /// Minimum `total_requests` before the failure rate is trusted.
    pub min_sample_size: u64,
    /// Failure rate that must be exceeded to quarantine.
    pub failure_threshold: f64,
}

impl Default for ProxyPoolConfig {
    fn default() -> Self {
        Self {
            quarantine: DEFAULT_QUARANTINE,
            min_sample_size: DEFAULT_MIN_SAMPLE_SIZE,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
        }
    }
}

/// Mutable usage statistics of one proxy.
///
/// Only the pool mutates these, through `mark_used` and `mark_completed`.
#[derive(Debug, Clone, Default)]
pub struct ProxyStats {
    total_requests: u64,
    failures: u64,
    concurrent_in_flight: u32,
    last_used_at: Option<Instant>,
    blocked_until: Option<Instant>,
    recent: VecDeque<Instant>,
}

impl ProxyStats {
    /// Returns the total number of requests.
    #[inline]
    #[must_use]
    pub fn total_requests(&self) -> u64 {
        self.total_requests
    }

    /// Returns the number of failed requests.
    #[inline]
    #[must_use]
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Returns the number of requests currently in flight.
    #[inline]
    #[must_use]
    pub fn concurrent_in_flight(&self) -> u32 {
        self.concurrent_in_flight
    }

    /// Returns `failures / max(total_requests, 1)`.
    #[must_use]
    pub fn failure_rate(&self) -> f64 {
        self.failures as f64 / self.total_requests.max(1) as f64
    }

    /// Returns true while the proxy is quarantined.
    #[must_use]
    pub fn is_blocked(&self, now: Instant) -> bool {
        self.blocked_until.is_some_and(|until| until > now)
    }

    fn prune_window(&mut self, now: Instant) {
        while let Some(front) = self.recent.front() {
            if now.saturating_duration_since(*front) >= RATE_WINDOW {
                self.recent.pop_front();
            } else {
                break;
            }
        }
    }

    fn requests_in_window(&self, now: Instant) -> usize {
        self.recent
            .iter()
            .filter(|at| now.saturating_duration_since(**at) < RATE_WINDOW)
            .count()
    }

    fn is_available(&self, record: &ProxyRecord, now: Instant) -> bool {
        !self.is_blocked(now)
            && self.concurrent_in_flight < record.max_concurrent()
            && self.requests_in_window(now) < record.rate_per_minute() as usize
    }

    fn score(&self) -> ProxyScore {
        ProxyScore {
            concurrent_in_flight: self.concurrent_in_flight,
            failure_rate: self.failure_rate(),
            total_requests: self.total_requests,
        }
    }
}

/// Selection key for eligible proxies; lower is better.
///
/// Compared field by field: current concurrency, then observed failure
/// rate, then total requests. Proxies with equal scores are resolved in
/// the order they were added to the pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProxyScore {
    /// Requests currently in flight.
    pub concurrent_in_flight: u32,
    /// Observed failure rate.
    pub failure_rate: f64,
    /// Lifetime request count.
    pub total_requests: u64,
}

impl Eq for ProxyScore {}

impl PartialOrd for ProxyScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ProxyScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.concurrent_in_flight
            .cmp(&other.concurrent_in_flight)
            .then_with(|| self.failure_rate.total_cmp(&other.failure_rate))
            .then_with(|| self.total_requests.cmp(&other.total_requests))
    }
}

/// Point-in-time view of one proxy, for the health endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProxyStatsSnapshot {
    /// Proxy identifier.
    pub proxy: ProxyId,
    /// Total requests.
    pub total_requests: u64,
    /// Failed requests.
    pub failures: u64,
    /// Failure rate.
    pub failure_rate: f64,
    /// Requests in flight.
    pub concurrent_in_flight: u32,
    /// Requests made in the trailing minute.
    pub requests_last_minute: usize,
    /// When the proxy was last handed out.
    pub last_used_at: Option<Timestamp>,
    /// End of the current quarantine, if any.
    pub blocked_until: Option<Timestamp>,
    /// Whether `select_best` could return this proxy right now.
    pub available: bool,
}

#[derive(Debug)]
struct ProxySlot {
    record: Arc<ProxyRecord>,
    stats: ProxyStats,
}

/// Pool of egress proxies with load balancing and quarantine.
pub struct ProxyPool {
    slots: Mutex<Vec<ProxySlot>>,
    config: ProxyPoolConfig,
    probe: Arc<dyn ProxyProbe>,
}

impl fmt::Debug for ProxyPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyPool")
            .field("proxies", &self.len())
            .field("config", &self.config)
            .finish()
    }
}

impl ProxyPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new(config: ProxyPoolConfig, probe: Arc<dyn ProxyProbe>) -> Self {
        Self {
            slots: Mutex::new(Vec::new()),
            config,
            probe,
        }
    }

    /// Creates an empty pool with default tuning and the HTTP probe.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ProxyPoolConfig::default(), Arc::new(ReqwestProbe::default()))
    }

    /// Adds a proxy. A proxy with the same `host:port` is replaced and its
    /// statistics reset.
    pub fn add_proxy(&self, record: ProxyRecord) {
        let id = record.id();
        let mut slots = self.slots.lock();
        slots.retain(|slot| slot.record.id() != id);
        slots.push(ProxySlot {
            record: Arc::new(record),
            stats: ProxyStats::default(),
        });
        tracing::info!(proxy = %id, "added proxy");
    }

    /// Adds several proxies.
    pub fn add_proxies(&self, records: impl IntoIterator<Item = ProxyRecord>) {
        for record in records {
            self.add_proxy(record);
        }
    }

    /// Removes a proxy. Returns true if it was present.
    pub fn remove_proxy(&self, id: &ProxyId) -> bool {
        let mut slots = self.slots.lock();
        let before = slots.len();
        slots.retain(|slot| &slot.record.id() != id);
        before != slots.len()
    }

    /// Returns the number of proxies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Returns true if the pool has no proxies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the best eligible proxy without reserving it.
    #[must_use]
    pub fn select_best(&self) -> Option<Arc<ProxyRecord>> {
        let now = Instant::now();
        let slots = self.slots.lock();
        Self::best_index(&slots, now)
            .and_then(|idx| slots.get(idx))
            .map(|slot| Arc::clone(&slot.record))
    }

    /// Selects the best eligible proxy and marks it used in one step.
    ///
    /// Returns `None` when the pool is empty or every proxy is unavailable;
    /// callers then fall back to a direct connection.
    #[must_use]
    pub fn acquire(self: &Arc<Self>) -> Option<ProxyLease> {
        let now = Instant::now();
        let record = {
            let mut slots = self.slots.lock();
            let idx = Self::best_index(&slots, now)?;
            let slot = slots.get_mut(idx)?;
            Self::apply_used(&mut slot.stats, now);
            Arc::clone(&slot.record)
        };

        tracing::debug!(proxy = %record.id(), "leased proxy");
        Some(ProxyLease {
            pool: Arc::clone(self),
            record,
            completed: false,
        })
    }

    /// Records that a request is starting through `proxy`.
    pub fn mark_used(&self, proxy: &ProxyId) {
        let now = Instant::now();
        let mut slots = self.slots.lock();
        if let Some(slot) = slots.iter_mut().find(|s| &s.record.id() == proxy) {
            Self::apply_used(&mut slot.stats, now);
        }
    }

    /// Records that a request through `proxy` finished.
    ///
    /// On failure the proxy is quarantined once its failure rate exceeds the
    /// threshold over at least `min_sample_size` requests.
    pub fn mark_completed(&self, proxy: &ProxyId, success: bool) {
        let now = Instant::now();
        let mut slots = self.slots.lock();
        if let Some(slot) = slots.iter_mut().find(|s| &s.record.id() == proxy) {
            self.apply_completed(slot, success, now);
        }
    }

    /// Completes a lease against the exact slot it was taken from. A slot
    /// that was removed, or replaced by re-adding the same `host:port`, is
    /// left untouched.
    fn complete_lease(&self, record: &Arc<ProxyRecord>, success: bool) {
        let now = Instant::now();
        let mut slots = self.slots.lock();
        if let Some(slot) = slots.iter_mut().find(|s| Arc::ptr_eq(&s.record, record)) {
            self.apply_completed(slot, success, now);
        }
    }

    /// Probes every proxy concurrently; a failed probe counts as one failed
    /// request for that proxy.
    ///
    /// Returns the statistics snapshot taken after all probes finished.
    pub async fn health_check_all(&self) -> Vec<ProxyStatsSnapshot> {
        let records: Vec<Arc<ProxyRecord>> = self
            .slots
            .lock()
            .iter()
            .map(|slot| Arc::clone(&slot.record))
            .collect();

        let outcomes = futures::future::join_all(records.iter().map(|record| {
            let probe = Arc::clone(&self.probe);
            async move { probe.probe(record).await }
        }))
        .await;

        let now = Instant::now();
        let mut slots = self.slots.lock();
        for (record, healthy) in records.iter().zip(outcomes) {
            let id = record.id();
            let Some(slot) = slots.iter_mut().find(|s| Arc::ptr_eq(&s.record, record)) else {
                continue;
            };
            slot.stats.total_requests = slot.stats.total_requests.saturating_add(1);
            if healthy {
                tracing::info!(proxy = %id, "proxy health check passed");
            } else {
                tracing::warn!(proxy = %id, "proxy health check failed");
                slot.stats.failures = slot.stats.failures.saturating_add(1);
                self.maybe_quarantine(&id, &mut slot.stats, now);
            }
        }
        Self::snapshot_locked(&mut slots, now)
    }

    /// Returns a statistics snapshot for every proxy.
    #[must_use]
    pub fn stats(&self) -> Vec<ProxyStatsSnapshot> {
        let now = Instant::now();
        let mut slots = self.slots.lock();
        Self::snapshot_locked(&mut slots, now)
    }

    fn best_index(slots: &[ProxySlot], now: Instant) -> Option<usize> {
        slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.stats.is_available(&slot.record, now))
            .min_by(|(_, a), (_, b)| a.stats.score().cmp(&b.stats.score()))
            .map(|(idx, _)| idx)
    }

    fn apply_used(stats: &mut ProxyStats, now: Instant) {
        stats.prune_window(now);
        stats.total_requests = stats.total_requests.saturating_add(1);
        stats.concurrent_in_flight = stats.concurrent_in_flight.saturating_add(1);
        stats.last_used_at = Some(now);
        stats.recent.push_back(now);
    }

    fn apply_completed(&self, slot: &mut ProxySlot, success: bool, now: Instant) {
        let stats = &mut slot.stats;
        stats.concurrent_in_flight = stats.concurrent_in_flight.saturating_sub(1);
        if !success {
            stats.failures = stats.failures.saturating_add(1);
            self.maybe_quarantine(&slot.record.id(), stats, now);
        }
    }

    fn maybe_quarantine(&self, proxy: &ProxyId, stats: &mut ProxyStats, now: Instant) {
        if stats.total_requests >= self.config.min_sample_size
            && stats.failure_rate() > self.config.failure_threshold
        {
            stats.blocked_until = Some(now + self.config.quarantine);
            tracing::warn!(
                proxy = %proxy,
                failure_rate = stats.failure_rate(),
                total_requests = stats.total_requests,
                quarantine_secs = self.config.quarantine.as_secs(),
                "proxy quarantined due to high failure rate"
            );
        }
    }

    fn snapshot_locked(slots: &mut [ProxySlot], now: Instant) -> Vec<ProxyStatsSnapshot> {
        let wall_now = Timestamp::now();
        slots
            .iter_mut()
            .map(|slot| {
                slot.stats.prune_window(now);
                let stats = &slot.stats;
                ProxyStatsSnapshot {
                    proxy: slot.record.id(),
                    total_requests: stats.total_requests,
                    failures: stats.failures,
                    failure_rate: stats.failure_rate(),
                    concurrent_in_flight: stats.concurrent_in_flight,
                    requests_last_minute: stats.requests_in_window(now),
                    last_used_at: stats
                        .last_used_at
                        .map(|at| wall_now - now.saturating_duration_since(at)),
                    blocked_until: stats
                        .blocked_until
                        .filter(|until| *until > now)
                        .map(|until| wall_now + until.saturating_duration_since(now)),
                    available: stats.is_available(&slot.record, now),
                }
            })
            .collect()
    }
}

/// A reserved proxy for one outbound request.
///
/// Call [`complete`](Self::complete) with the outcome. Dropping the lease
/// without completing it records a failure.
#[derive(Debug)]
pub struct ProxyLease {
    pool: Arc<ProxyPool>,
    record: Arc<ProxyRecord>,
    completed: bool,
}

impl ProxyLease {
    /// Returns the leased proxy.
    #[must_use]
    pub fn record(&self) -> &ProxyRecord {
        &self.record
    }

    /// Records the outcome and releases the lease.
    pub fn complete(mut self, success: bool) {
        self.completed = true;
        self.pool.complete_lease(&self.record, success);
    }
}

impl Drop for ProxyLease {
    fn drop(&mut self) {
        if !self.completed {
            tracing::debug!(proxy = %self.record.id(), "proxy lease dropped before completion");
            self.pool.complete_lease(&self.record, false);
        }
    }
}
