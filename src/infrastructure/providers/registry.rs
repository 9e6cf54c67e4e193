//! # In-Memory Provider Registry
//!
//! [`ProviderRegistry`] backed by a `Vec` behind a tokio `RwLock`.

use crate::domain::value_objects::ProviderId;
use crate::infrastructure::providers::traits::{ProviderAdapter, ProviderRegistry};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory provider registry.
///
/// Registering an adapter whose id is already present replaces it in place.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProviderRegistry {
    providers: Arc<RwLock<Vec<Arc<dyn ProviderAdapter>>>>,
}

impl InMemoryProviderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding `providers`.
    #[must_use]
    pub fn with_providers(providers: Vec<Arc<dyn ProviderAdapter>>) -> Self {
        Self {
            providers: Arc::new(RwLock::new(providers)),
        }
    }

    /// Registers an adapter.
    pub async fn register(&self, adapter: Arc<dyn ProviderAdapter>) {
        let mut providers = self.providers.write().await;
        match providers
            .iter_mut()
            .find(|p| p.provider_id() == adapter.provider_id())
        {
            Some(slot) => *slot = adapter,
            None => providers.push(adapter),
        }
    }

    /// Removes an adapter. Returns true if it was registered.
    pub async fn unregister(&self, id: &ProviderId) -> bool {
        let mut providers = self.providers.write().await;
        let before = providers.len();
        providers.retain(|p| p.provider_id() != id);
        before != providers.len()
    }

    /// Returns the number of registered adapters.
    pub async fn len(&self) -> usize {
        self.providers.read().await.len()
    }

    /// Returns true if no adapters are registered.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ProviderRegistry for InMemoryProviderRegistry {
    async fn available_providers(&self) -> Vec<Arc<dyn ProviderAdapter>> {
        self.providers.read().await.clone()
    }
}
