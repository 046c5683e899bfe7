//! Shared state for the API.

use anyhow::Context;

use mirror_commerce::catalog::seed_if_empty;
use mirror_commerce::service::ProductService;
use mirror_commerce::store::{InMemoryStore, ProductStore};
use mirror_core::AppConfig;
use mirror_security::{BucketStore, MemoryBucketStore, SecurityHeaders, Throttle};

/// Everything a request handler needs.
pub struct ApiState {
    pub config: AppConfig,
    pub service: ProductService<Box<dyn ProductStore>>,
    pub throttle: Throttle,
    pub headers: SecurityHeaders,
}

impl ApiState {
    /// Build state over `store`, seeding it when the config asks for it.
    /// Throttle buckets are kept in memory.
    pub fn new(config: AppConfig, store: Box<dyn ProductStore>) -> anyhow::Result<Self> {
        Self::with_buckets(config, store, Box::new(MemoryBucketStore::new()))
    }

    /// Build state whose throttle keeps its buckets in `buckets`.
    pub fn with_buckets(
        config: AppConfig,
        store: Box<dyn ProductStore>,
        buckets: Box<dyn BucketStore>,
    ) -> anyhow::Result<Self> {
        config.validate().context("invalid configuration")?;

        if config.database.seed_on_start {
            let inserted = seed_if_empty(&store).context("failed to seed product catalog")?;
            if inserted > 0 {
                tracing::info!(inserted, "product catalog seeded");
            }
        }

        let throttle = Throttle::from_config_with_store(&config.throttle, buckets)
            .context("invalid throttle limits")?;
        let headers = SecurityHeaders::from_config(&config.security, config.environment);

        Ok(Self {
            config,
            service: ProductService::new(store),
            throttle,
            headers,
        })
    }

    /// State over a fresh in-memory store.
    pub fn in_memory(config: AppConfig) -> anyhow::Result<Self> {
        Self::new(config, Box::new(InMemoryStore::new()))
    }
}

impl std::fmt::Debug for ApiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_state_is_seeded() {
        let state = ApiState::in_memory(AppConfig::default()).unwrap();
        assert_eq!(state.service.find_all().unwrap().len(), 12);
    }

    #[test]
    fn test_seeding_can_be_disabled() {
        let mut config = AppConfig::default();
        config.database.seed_on_start = false;
        let state = ApiState::in_memory(config).unwrap();
        assert!(state.service.find_all().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = AppConfig::default();
        config.throttle.search_limit = 0;
        let err = ApiState::in_memory(config).unwrap_err();
        assert!(format!("{err:#}").contains("throttle.search_limit"));
    }
}
