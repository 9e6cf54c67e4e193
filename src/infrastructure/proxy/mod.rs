//! # Proxy Infrastructure
//!
//! Egress proxy pool used by provider adapters.
//!
//! - [`pool`]: selection, usage accounting and quarantine
//! - [`probe`]: liveness checks used by `health_check_all`
//! - [`loader`]: proxy definitions from the environment

pub mod loader;
pub mod pool;
pub mod probe;

pub use pool::{ProxyLease, ProxyPool, ProxyPoolConfig, ProxyScore, ProxyStats, ProxyStatsSnapshot};
pub use probe::{ProxyProbe, ReqwestProbe};
