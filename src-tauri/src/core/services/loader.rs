//! Per-service configuration loading
//!
//! Every identifier in a service list has its own settings key holding a
//! [`ServiceConfig`]. Loads fetch all of them concurrently and publish the
//! complete map in one swap. Each load carries a generation number and a
//! load finishing after a newer one started is discarded, so a slow stale
//! load can never overwrite a fresher map.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::task::JoinSet;

use crate::shared::settings::SettingsStore;
use crate::shared::types::{ServiceConfig, ServiceIdentifier};

pub type ConfigMap = HashMap<ServiceIdentifier, ServiceConfig>;

/// Fetch the config of every identifier in `list`. Missing, non-object or
/// unreadable values become an empty config.
pub async fn load_configs(store: Arc<dyn SettingsStore>, list: &[ServiceIdentifier]) -> ConfigMap {
    let mut fetches = JoinSet::new();
    for identifier in list.iter().cloned() {
        let store = store.clone();
        fetches.spawn(async move {
            let config = match store.get(identifier.as_str()).await {
                Ok(Some(raw)) => ServiceConfig::from_value(raw).unwrap_or_else(|| {
                    log::warn!("[Config] '{}' is not an object, using defaults", identifier);
                    ServiceConfig::new()
                }),
                Ok(None) => ServiceConfig::new(),
                Err(e) => {
                    log::warn!("[Config] Failed to read '{}': {}", identifier, e);
                    ServiceConfig::new()
                }
            };
            (identifier, config)
        });
    }

    let mut configs = ConfigMap::with_capacity(list.len());
    while let Some(joined) = fetches.join_next().await {
        match joined {
            Ok((identifier, config)) => {
                configs.insert(identifier, config);
            }
            Err(e) => log::warn!("[Config] Config fetch task failed: {}", e),
        }
    }
    // A panicked fetch still leaves its service with the default
    for identifier in list {
        configs.entry(identifier.clone()).or_default();
    }
    configs
}

pub struct ServiceConfigLoader {
    store: Arc<dyn SettingsStore>,
    generation: AtomicU64,
    published: RwLock<Arc<ConfigMap>>,
}

impl ServiceConfigLoader {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self {
            store,
            generation: AtomicU64::new(0),
            published: RwLock::new(Arc::new(ConfigMap::new())),
        }
    }

    /// Load configs for `list` and publish them unless a newer load started
    /// meanwhile. Returns whether this load was published.
    pub async fn refresh(&self, list: &[ServiceIdentifier]) -> bool {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let configs = load_configs(self.store.clone(), list).await;
        self.publish(generation, configs)
    }

    fn publish(&self, generation: u64, configs: ConfigMap) -> bool {
        let mut published = match self.published.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Checked under the write lock so two finishing loads cannot interleave
        if self.generation.load(Ordering::SeqCst) != generation {
            log::debug!("[Config] Dropping stale config load #{}", generation);
            return false;
        }
        *published = Arc::new(configs);
        true
    }

    pub fn current(&self) -> Arc<ConfigMap> {
        match self.published.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn config(&self, identifier: &ServiceIdentifier) -> ServiceConfig {
        self.current().get(identifier).cloned().unwrap_or_default()
    }

    /// Enablement under the default rule: unknown services are enabled
    pub fn is_enabled(&self, identifier: &ServiceIdentifier) -> bool {
        self.current()
            .get(identifier)
            .map_or(true, ServiceConfig::is_enabled)
    }
}
