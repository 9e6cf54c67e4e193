//! # Provider Adapters
//!
//! Integrations with upstream money-transfer services.
//!
//! - [`traits`]: the [`ProviderAdapter`] port and [`ProviderRegistry`]
//! - [`error`]: [`ProviderError`]
//! - [`http_client`]: shared client with proxy leasing
//! - [`hanpass`], [`e9pay`], [`gme`], [`cross`]: concrete adapters

pub mod cross;
pub mod e9pay;
pub mod error;
pub mod gme;
pub mod hanpass;
pub mod http_client;
pub mod payload;
pub mod registry;
pub mod traits;

pub use cross::CrossAdapter;
pub use e9pay::E9PayAdapter;
pub use error::{ProviderError, ProviderResult};
pub use gme::GmeAdapter;
pub use hanpass::HanpassAdapter;
pub use http_client::HttpClient;
pub use registry::InMemoryProviderRegistry;
pub use traits::{ProviderAdapter, ProviderRegistry};

use crate::infrastructure::config::{ProviderSettings, ProvidersConfig};
use std::sync::Arc;

/// Builds every enabled built-in adapter, sharing `client`.
#[must_use]
pub fn build_adapters(config: &ProvidersConfig, client: &HttpClient) -> Vec<Arc<dyn ProviderAdapter>> {
    fn url(settings: &ProviderSettings, default: &str) -> String {
        settings
            .base_url
            .clone()
            .unwrap_or_else(|| default.to_string())
    }

    let mut adapters: Vec<Arc<dyn ProviderAdapter>> = Vec::new();
    if config.hanpass.enabled {
        adapters.push(Arc::new(HanpassAdapter::new(
            url(&config.hanpass, hanpass::DEFAULT_BASE_URL),
            client.clone(),
        )));
    }
    if config.e9pay.enabled {
        adapters.push(Arc::new(E9PayAdapter::new(
            url(&config.e9pay, e9pay::DEFAULT_BASE_URL),
            client.clone(),
        )));
    }
    if config.gme.enabled {
        adapters.push(Arc::new(GmeAdapter::new(
            url(&config.gme, gme::DEFAULT_BASE_URL),
            client.clone(),
        )));
    }
    if config.cross.enabled {
        adapters.push(Arc::new(CrossAdapter::new(
            url(&config.cross, cross::DEFAULT_BASE_URL),
            client.clone(),
        )));
    }
    adapters
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn disabled_adapters_are_skipped() {
        let mut config = ProvidersConfig::default();
        config.gme.enabled = false;
        let client = HttpClient::new(1000).unwrap();

        let ids: Vec<String> = build_adapters(&config, &client)
            .iter()
            .map(|a| a.provider_id().to_string())
            .collect();
        assert_eq!(ids, vec!["Hanpass", "E9Pay", "Cross"]);
    }
}
