//! # HTTP Client Utilities
//!
//! Shared HTTP client for provider adapters.
//!
//! Every request:
//! - goes through a proxy leased from the [`ProxyPool`] when one is
//!   available, otherwise straight out
//! - carries a User-Agent picked at random from a browser list
//! - reports its transport outcome back to the leased proxy
//!
//! One `reqwest::Client` is built per proxy and reused, so connection pools
//! survive across requests.
//!
//! # Examples
//!
//! ```no_run
//! use remit_quote::infrastructure::providers::http_client::HttpClient;
//! use serde_json::Value;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new(2000)?;
//! let body: Value = client
//!     .get_with_params("https://api.example.com/rates", &[("to", "VND")], Default::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```

use crate::domain::entities::ProxyRecord;
use crate::domain::value_objects::ProxyId;
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use crate::infrastructure::proxy::ProxyPool;
use dashmap::DashMap;
use rand::seq::IndexedRandom;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Browser User-Agent strings rotated across requests.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 14_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (iPad; CPU OS 14_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Android 10; Mobile; rv:89.0) Gecko/89.0 Firefox/89.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:89.0) Gecko/20100101 Firefox/89.0",
];

/// Returns a random entry of [`USER_AGENTS`].
#[must_use]
pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or("Mozilla/5.0")
}

/// HTTP client wrapper for provider adapters.
#[derive(Debug, Clone)]
pub struct HttpClient {
    direct: Client,
    proxied: Arc<DashMap<ProxyId, Client>>,
    proxy_pool: Option<Arc<ProxyPool>>,
    timeout_ms: u64,
}

impl HttpClient {
    /// Creates a direct-only client with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::InternalError` if the client cannot be created.
    pub fn new(timeout_ms: u64) -> ProviderResult<Self> {
        Ok(Self {
            direct: build_client(timeout_ms, None)?,
            proxied: Arc::new(DashMap::new()),
            proxy_pool: None,
            timeout_ms,
        })
    }

    /// Routes requests through `pool` whenever it has an eligible proxy.
    #[must_use]
    pub fn with_proxy_pool(mut self, pool: Arc<ProxyPool>) -> Self {
        self.proxy_pool = Some(pool);
        self
    }

    /// Returns the configured timeout in milliseconds.
    #[inline]
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Makes a GET request with query parameters and deserializes the JSON
    /// response.
    ///
    /// # Errors
    ///
    /// Returns a transport `ProviderError` if the request fails or the
    /// status is not 2xx, and `ProviderError::ProtocolError` if the body is
    /// not the expected JSON.
    pub async fn get_with_params<T: DeserializeOwned, P: Serialize + ?Sized>(
        &self,
        url: &str,
        params: &P,
        headers: HeaderMap,
    ) -> ProviderResult<T> {
        let response = self
            .execute(|client| client.get(url).query(params).headers(headers))
            .await?;
        parse_json(response).await
    }

    /// Makes a POST request with a JSON body and deserializes the JSON
    /// response.
    ///
    /// # Errors
    ///
    /// Same as [`get_with_params`](Self::get_with_params).
    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        headers: HeaderMap,
    ) -> ProviderResult<T> {
        let response = self
            .execute(|client| client.post(url).json(body).headers(headers))
            .await?;
        parse_json(response).await
    }

    /// Makes a POST request with a form-encoded body and deserializes the
    /// JSON response.
    ///
    /// # Errors
    ///
    /// Same as [`get_with_params`](Self::get_with_params).
    pub async fn post_form<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        form: &B,
        headers: HeaderMap,
    ) -> ProviderResult<T> {
        let response = self
            .execute(|client| client.post(url).form(form).headers(headers))
            .await?;
        parse_json(response).await
    }

    /// Sends a request built by `build`, through a leased proxy if any.
    ///
    /// The lease is completed before the body is parsed: only transport
    /// outcomes count against the proxy.
    async fn execute<F>(&self, build: F) -> ProviderResult<Response>
    where
        F: FnOnce(&Client) -> RequestBuilder,
    {
        let lease = self.proxy_pool.as_ref().and_then(|pool| pool.acquire());
        let client = match &lease {
            Some(lease) => self.proxied_client(lease.record())?,
            None => self.direct.clone(),
        };

        let request = build(&client).header(USER_AGENT, HeaderValue::from_static(random_user_agent()));
        let outcome = match request.send().await {
            Ok(response) if response.status().is_success() => Ok(response),
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                Err(map_status_error(status, &body))
            }
            Err(e) => Err(map_reqwest_error(e)),
        };

        if let Some(lease) = lease {
            let failed = outcome
                .as_ref()
                .is_err_and(ProviderError::is_transport_failure);
            lease.complete(!failed);
        }
        outcome
    }

    fn proxied_client(&self, proxy: &ProxyRecord) -> ProviderResult<Client> {
        let id = proxy.id();
        if let Some(client) = self.proxied.get(&id) {
            return Ok(client.clone());
        }
        let client = build_client(self.timeout_ms, Some(proxy))?;
        self.proxied.insert(id, client.clone());
        Ok(client)
    }
}

fn build_client(timeout_ms: u64, proxy: Option<&ProxyRecord>) -> ProviderResult<Client> {
    let mut builder = Client::builder().timeout(Duration::from_millis(timeout_ms));
    if let Some(proxy) = proxy {
        let proxy = reqwest::Proxy::all(proxy.url()).map_err(|e| {
            ProviderError::internal_error(format!("Invalid proxy {}: {}", proxy, e))
        })?;
        builder = builder.proxy(proxy);
    }
    builder
        .build()
        .map_err(|e| ProviderError::internal_error(format!("Failed to create HTTP client: {}", e)))
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> ProviderResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::protocol_error(format!("Failed to parse response: {}", e)))
}

fn map_reqwest_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::timeout("Request timed out")
    } else if error.is_connect() {
        ProviderError::connection(format!("Connection failed: {}", error))
    } else {
        ProviderError::connection(format!("HTTP request failed: {}", error))
    }
}

fn map_status_error(status: StatusCode, body: &str) -> ProviderError {
    let snippet: String = body.chars().take(200).collect();
    match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited("Rate limit exceeded"),
        _ => ProviderError::http_status(status.as_u16(), snippet),
    }
}
