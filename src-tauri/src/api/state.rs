use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::AppPaths;
use crate::core::services::catalog::SharedCatalog;
use crate::core::services::{ActivationGuard, ServiceListOrchestrator, ServiceRegistry};
use crate::shared::error::{AppError, AppResult};
use crate::shared::events::EventBus;
use crate::shared::settings::SettingsStore;
use crate::shared::types::Category;
use crate::system::window::TranslateWindowTracker;

/// Everything commands need, managed by Tauri for the app's lifetime
pub struct AppState {
    pub paths: AppPaths,
    pub store: Arc<dyn SettingsStore>,
    pub events: EventBus,
    pub registry: Arc<ServiceRegistry>,
    pub runtime: tokio::runtime::Handle,
    /// One plugin catalog for every category's list
    pub catalog: SharedCatalog,
    orchestrators: HashMap<Category, Arc<ServiceListOrchestrator>>,
    guards: Mutex<Vec<ActivationGuard>>,
    tracker: Mutex<Option<Arc<TranslateWindowTracker>>>,
}

impl AppState {
    pub fn new(
        paths: AppPaths,
        store: Arc<dyn SettingsStore>,
        events: EventBus,
        registry: Arc<ServiceRegistry>,
        runtime: tokio::runtime::Handle,
    ) -> Self {
        let catalog = SharedCatalog::new(paths.plugins_dir());
        let orchestrators = Category::ALL
            .iter()
            .map(|category| {
                let orchestrator = ServiceListOrchestrator::new(
                    *category,
                    store.clone(),
                    events.clone(),
                    registry.clone(),
                    catalog.clone(),
                );
                (*category, Arc::new(orchestrator))
            })
            .collect();
        Self {
            paths,
            store,
            events,
            registry,
            runtime,
            catalog,
            orchestrators,
            guards: Mutex::new(Vec::new()),
            tracker: Mutex::new(None),
        }
    }

    pub fn orchestrator(&self, category: Category) -> AppResult<Arc<ServiceListOrchestrator>> {
        self.orchestrators
            .get(&category)
            .cloned()
            .ok_or_else(|| AppError::Validation(format!("No service list for {}", category)))
    }

    pub fn orchestrators(&self) -> Vec<Arc<ServiceListOrchestrator>> {
        Category::ALL
            .iter()
            .filter_map(|category| self.orchestrators.get(category).cloned())
            .collect()
    }

    /// Mount every list and keep its listener alive until shutdown
    pub async fn start(&self) {
        for orchestrator in self.orchestrators() {
            orchestrator.mount().await;
            let guard = orchestrator.activate();
            match self.guards.lock() {
                Ok(mut guards) => guards.push(guard),
                Err(poisoned) => poisoned.into_inner().push(guard),
            }
        }
    }

    pub fn tracker(&self) -> Option<Arc<TranslateWindowTracker>> {
        match self.tracker.lock() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set_tracker(&self, tracker: Option<Arc<TranslateWindowTracker>>) {
        match self.tracker.lock() {
            Ok(mut slot) => *slot = tracker,
            Err(poisoned) => *poisoned.into_inner() = tracker,
        }
    }
}
