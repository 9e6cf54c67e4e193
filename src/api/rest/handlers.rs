//! # REST Handlers
//!
//! Request handlers, shared state and error mapping.

use crate::application::dto::{AggregatedResponse, QuoteRequest};
use crate::application::error::ApplicationError;
use crate::application::use_cases::GetRemittanceQuoteUseCase;
use crate::domain::value_objects::CallerId;
use crate::infrastructure::proxy::{ProxyPool, ProxyStatsSnapshot};
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{ConnectInfo, FromRequestParts, Query, State};
use axum::http::request::Parts;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

/// Header consulted when the peer address is unavailable.
pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Shared state for all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Quote request flow.
    pub quote_use_case: Arc<GetRemittanceQuoteUseCase>,
    /// Egress proxy pool.
    pub proxy_pool: Arc<ProxyPool>,
}

impl AppState {
    /// Creates the shared state.
    #[must_use]
    pub fn new(quote_use_case: Arc<GetRemittanceQuoteUseCase>, proxy_pool: Arc<ProxyPool>) -> Self {
        Self {
            quote_use_case,
            proxy_pool,
        }
    }
}

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
}

/// Health check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` when the process serves requests.
    pub status: String,
}

/// Proxy health response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProxyHealthResponse {
    /// Number of proxies in the pool.
    pub total: usize,
    /// Proxies selectable right now.
    pub available: usize,
    /// Per-proxy statistics after the probe round.
    pub proxies: Vec<ProxyStatsSnapshot>,
}

/// Error returned by handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Outcome of the quote use case.
    Application(ApplicationError),
    /// Query string could not be decoded.
    BadRequest(String),
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        Self::Application(error)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Application(e) => match e {
                ApplicationError::Validation(_) => StatusCode::BAD_REQUEST,
                ApplicationError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                ApplicationError::NoProvidersAvailable => StatusCode::NOT_FOUND,
                ApplicationError::RequestTimedOut => StatusCode::REQUEST_TIMEOUT,
                ApplicationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, retry_after) = match self {
            Self::BadRequest(reason) => (reason, None),
            Self::Application(ApplicationError::RateLimited { retry_after }) => (
                ApplicationError::RateLimited { retry_after }.to_string(),
                Some(retry_after),
            ),
            Self::Application(ApplicationError::Internal(detail)) => {
                tracing::error!(detail = %detail, "internal error");
                (
                    "Failed to retrieve remittance data. Please try again later.".to_string(),
                    None,
                )
            }
            Self::Application(other) => (other.to_string(), None),
        };

        let mut response = (status, Json(ErrorResponse { error: message })).into_response();
        if let Some(retry_after) = retry_after {
            // Rounded up so a client never retries inside the window.
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            if let Ok(value) = HeaderValue::from_str(&secs.max(1).to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Identity used for rate limiting.
///
/// The peer IP when the server was started with connect info, otherwise the
/// first `X-Forwarded-For` entry, otherwise `unknown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity(pub CallerId);

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        let identity = peer
            .or_else(|| {
                parts
                    .headers
                    .get(FORWARDED_FOR)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.split(',').next())
                    .map(str::trim)
                    .filter(|first| !first.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "unknown".to_string());

        Ok(Self(CallerId::new(identity)))
    }
}

/// `GET /api/getRemittanceQuote`
///
/// # Errors
///
/// Maps every [`ApplicationError`] and malformed query string to an
/// [`ApiError`].
pub async fn get_remittance_quote(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    params: Result<Query<QuoteRequest>, QueryRejection>,
) -> ApiResult<Json<AggregatedResponse>> {
    let Query(request) = params?;
    let response = state.quote_use_case.execute(&caller, request).await?;
    Ok(Json(AggregatedResponse::clone(&response)))
}

/// `GET /api/proxy/health`
///
/// Probes every proxy, then reports the resulting statistics.
pub async fn proxy_health(State(state): State<AppState>) -> Json<ProxyHealthResponse> {
    let proxies = state.proxy_pool.health_check_all().await;
    Json(ProxyHealthResponse {
        total: proxies.len(),
        available: proxies.iter().filter(|p| p.available).count(),
        proxies,
    })
}

/// `GET /health`
#[allow(clippy::unused_async)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
