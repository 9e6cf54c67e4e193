//! Remittance quote server.
//!
//! Usage:
//!   remit-quote-server
//!   remit-quote-server --config remit-quote.toml --bind 127.0.0.1:8000

use anyhow::{Context, Result};
use clap::Parser;
use remit_quote::api::rest::{AppState, create_router};
use remit_quote::application::services::{
    AggregationConfig, QuoteAggregationEngine, RateLimiter, RateLimiterConfig,
    RecipientGetsStrategy, ResultCache, ResultCacheConfig,
};
use remit_quote::application::use_cases::GetRemittanceQuoteUseCase;
use remit_quote::infrastructure::config::{AppConfig, LoggingSettings};
use remit_quote::infrastructure::providers::{HttpClient, InMemoryProviderRegistry, build_adapters};
use remit_quote::infrastructure::proxy::{ProxyPool, ProxyPoolConfig, ReqwestProbe, loader};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "remit-quote-server")]
#[command(about = "Remittance quote aggregation server")]
#[command(version)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overriding the configuration
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref()).context("loading configuration")?;
    init_logging(&config.logging, args.json_logs);

    let bind_addr = match args.bind {
        Some(addr) => addr,
        None => config.bind_addr()?,
    };

    let proxy_pool = Arc::new(ProxyPool::new(
        ProxyPoolConfig {
            quarantine: Duration::from_secs(config.proxy.quarantine_secs),
            min_sample_size: config.proxy.min_sample_size,
            failure_threshold: config.proxy.failure_threshold,
        },
        Arc::new(ReqwestProbe::new(
            config.proxy.health_check_url.clone(),
            Duration::from_millis(config.proxy.probe_timeout_ms),
        )),
    ));
    if config.proxy.load_from_env {
        proxy_pool.add_proxies(loader::load_from_env());
    }
    tracing::info!(proxies = proxy_pool.len(), "proxy pool ready");

    let client = HttpClient::new(config.aggregation.per_provider_timeout_ms)
        .context("building HTTP client")?
        .with_proxy_pool(Arc::clone(&proxy_pool));
    let adapters = build_adapters(&config.providers, &client);
    tracing::info!(
        providers = ?adapters.iter().map(|a| a.provider_id().to_string()).collect::<Vec<_>>(),
        "providers registered"
    );

    let engine = QuoteAggregationEngine::new(
        Arc::new(InMemoryProviderRegistry::with_providers(adapters)),
        Arc::new(RecipientGetsStrategy),
        AggregationConfig::with_timeout(config.aggregation.global_timeout_ms)
            .with_per_provider_timeout(config.aggregation.per_provider_timeout_ms),
    );
    let use_case = Arc::new(GetRemittanceQuoteUseCase::new(
        Arc::new(engine),
        Arc::new(RateLimiter::new(RateLimiterConfig::new(
            config.rate_limit.max_requests,
            Duration::from_secs(config.rate_limit.window_secs),
        ))),
        Arc::new(ResultCache::new(ResultCacheConfig {
            ttl: Duration::from_secs(config.cache.ttl_secs),
            max_entries: config.cache.max_entries,
        })),
    ));

    let maintenance = spawn_maintenance(
        Arc::clone(&use_case),
        Duration::from_secs(config.server.maintenance_interval_secs.max(1)),
    );

    let router = create_router(AppState::new(use_case, proxy_pool), &config.server.cors_origins);
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;
    tracing::info!(addr = %bind_addr, "listening");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("serving")?;

    maintenance.abort();
    tracing::info!("shut down");
    Ok(())
}

fn init_logging(settings: &LoggingSettings, force_json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.level.as_str()));

    if settings.json || force_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn spawn_maintenance(
    use_case: Arc<GetRemittanceQuoteUseCase>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            use_case.maintenance();
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
