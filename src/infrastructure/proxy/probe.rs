//! # Proxy Probe
//!
//! Liveness check for a single proxy.

use crate::domain::entities::ProxyRecord;
use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

/// Default endpoint used to verify that a proxy forwards traffic.
pub const DEFAULT_HEALTH_CHECK_URL: &str = "https://httpbin.org/ip";

/// Default probe timeout.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Checks whether a proxy can carry a request.
#[async_trait]
pub trait ProxyProbe: Send + Sync + Debug {
    /// Returns true if a request through `proxy` succeeded.
    async fn probe(&self, proxy: &ProxyRecord) -> bool;
}

/// Probe that issues a GET to a known-good endpoint through the proxy.
#[derive(Debug, Clone)]
pub struct ReqwestProbe {
    url: String,
    timeout: Duration,
}

impl ReqwestProbe {
    /// Creates a probe against `url` with the given timeout.
    #[must_use]
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }

    /// Returns the probe URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for ReqwestProbe {
    fn default() -> Self {
        Self::new(DEFAULT_HEALTH_CHECK_URL, DEFAULT_PROBE_TIMEOUT)
    }
}

#[async_trait]
impl ProxyProbe for ReqwestProbe {
    async fn probe(&self, proxy: &ProxyRecord) -> bool {
        let client = reqwest::Proxy::all(proxy.url())
            .and_then(|p| {
                reqwest::Client::builder()
                    .proxy(p)
                    .timeout(self.timeout)
                    .build()
            });
        let client = match client {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(proxy = %proxy, error = %e, "failed to build probe client");
                return false;
            }
        };

        match client.get(&self.url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(proxy = %proxy, error = %e, "proxy probe failed");
                false
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn unreachable_proxy_fails() {
        let probe = ReqwestProbe::new("http://example.invalid/ip", Duration::from_secs(2));
        // Port 1 on loopback refuses connections.
        assert!(!probe.probe(&ProxyRecord::new("127.0.0.1", 1)).await);
    }

    #[tokio::test]
    async fn forwarding_proxy_passes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"origin\":\"1.2.3.4\"}"))
            .mount(&server)
            .await;

        let addr = server.address();
        let proxy = ProxyRecord::new(addr.ip().to_string(), addr.port());
        let probe = ReqwestProbe::new("http://upstream.test/ip", Duration::from_secs(2));
        assert!(probe.probe(&proxy).await);
    }

    #[tokio::test]
    async fn error_status_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(407))
            .mount(&server)
            .await;

        let addr = server.address();
        let proxy = ProxyRecord::new(addr.ip().to_string(), addr.port());
        let probe = ReqwestProbe::new("http://upstream.test/ip", Duration::from_secs(2));
        assert!(!probe.probe(&proxy).await);
    }
}
