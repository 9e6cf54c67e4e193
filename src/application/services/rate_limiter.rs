//! # Rate Limiter
//!
//! Per-caller sliding-window admission control.
//!
//! Each caller owns the timestamps of its admitted requests inside the
//! trailing window. A check prunes expired timestamps, then admits if the
//! remainder is below the ceiling and records the new request. The prune,
//! count and append happen under the caller's map-entry lock, so concurrent
//! requests from one caller cannot both take the last slot.
//!
//! # Examples
//!
//! ```
//! use remit_quote::application::services::rate_limiter::{RateLimiter, RateLimiterConfig};
//! use remit_quote::domain::value_objects::CallerId;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let limiter = RateLimiter::new(RateLimiterConfig::new(2, Duration::from_secs(60)));
//! let caller = CallerId::new("203.0.113.7");
//!
//! assert!(limiter.admit(&caller).is_allowed());
//! assert!(limiter.admit(&caller).is_allowed());
//! assert!(!limiter.admit(&caller).is_allowed());
//! # }
//! ```

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::value_objects::CallerId;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// Configuration for the rate limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Requests admitted per window.
    pub max_requests: usize,
    /// Window length.
    pub window: Duration,
}

impl RateLimiterConfig {
    /// Creates a configuration.
    #[must_use]
    pub const fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::new(15, Duration::from_secs(60))
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Request admitted.
    Allowed {
        /// Requests still available in the current window.
        remaining: usize,
    },
    /// Request rejected.
    Rejected {
        /// Time until the oldest request leaves the window.
        retry_after: Duration,
    },
}

impl Admission {
    /// Returns true if the request was admitted.
    #[inline]
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Sliding-window rate limiter keyed by caller identity.
#[derive(Debug)]
pub struct RateLimiter {
    windows: DashMap<CallerId, VecDeque<Instant>>,
    config: RateLimiterConfig,
}

impl RateLimiter {
    /// Creates a rate limiter.
    #[must_use]
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            windows: DashMap::new(),
            config,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    /// Checks and records a request from `caller`.
    pub fn admit(&self, caller: &CallerId) -> Admission {
        let now = Instant::now();
        let mut window = self.windows.entry(caller.clone()).or_default();
        prune(&mut window, now, self.config.window);

        if window.len() >= self.config.max_requests {
            let retry_after = window
                .front()
                .map(|oldest| self.config.window.saturating_sub(now.saturating_duration_since(*oldest)))
                .unwrap_or(self.config.window);
            return Admission::Rejected { retry_after };
        }

        window.push_back(now);
        Admission::Allowed {
            remaining: self.config.max_requests - window.len(),
        }
    }

    /// Like [`admit`](Self::admit), as a `Result`.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::RateLimited` when the caller is over its
    /// ceiling.
    pub fn check(&self, caller: &CallerId) -> ApplicationResult<()> {
        match self.admit(caller) {
            Admission::Allowed { .. } => Ok(()),
            Admission::Rejected { retry_after } => {
                tracing::warn!(caller = %caller, retry_after_ms = retry_after.as_millis() as u64, "rate limit exceeded");
                Err(ApplicationError::RateLimited { retry_after })
            }
        }
    }

    /// Drops callers with no requests inside the window. Returns how many
    /// were removed.
    pub fn purge_idle(&self) -> usize {
        let now = Instant::now();
        let before = self.windows.len();
        self.windows.retain(|_, window| {
            prune(window, now, self.config.window);
            !window.is_empty()
        });
        before.saturating_sub(self.windows.len())
    }

    /// Returns the number of callers currently tracked.
    #[must_use]
    pub fn tracked_callers(&self) -> usize {
        self.windows.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimiterConfig::default())
    }
}

fn prune(window: &mut VecDeque<Instant>, now: Instant, length: Duration) {
    while let Some(front) = window.front() {
        if now.saturating_duration_since(*front) >= length {
            window.pop_front();
        } else {
            break;
        }
    }
}
