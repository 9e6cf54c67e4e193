//! # REST API
//!
//! HTTP endpoints using axum.
//!
//! # Endpoints
//!
//! - `GET /api/getRemittanceQuote?receive_country&receive_currency&send_amount[&send_currency]`
//!   returns ranked quotes
//! - `GET /api/proxy/health` probes every egress proxy and returns its
//!   statistics
//! - `GET /health` liveness check
//!
//! # Status Codes
//!
//! | Outcome                | Status |
//! |------------------------|--------|
//! | invalid parameters     | 400    |
//! | rate limited           | 429    |
//! | no quotes              | 404    |
//! | global deadline, none  | 408    |
//! | internal failure       | 500    |
//!
//! # Usage
//!
//! ```ignore
//! use remit_quote::api::rest::{AppState, create_router};
//! use std::net::SocketAddr;
//!
//! let router = create_router(AppState::new(use_case, proxy_pool), &["*".to_string()]);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>()).await?;
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    ApiError, ApiResult, AppState, CallerIdentity, ErrorResponse, HealthResponse,
    ProxyHealthResponse,
};
pub use routes::create_router;
