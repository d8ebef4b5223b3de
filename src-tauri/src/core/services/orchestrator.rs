//! Service list orchestration
//!
//! Owns one category's ordered service list, its view of the shared plugin
//! catalog and the per-service configs, and keeps them consistent:
//!
//! - the persisted list order changes only through explicit list edits
//!   (`reorder`, `add_service`, `remove_service`)
//! - enablement and catalog membership only decide what is *visible*;
//!   a disabled or unresolvable service keeps its slot in the list
//! - every list change triggers a config reload

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Mutex;
use tokio::task::{JoinHandle, JoinSet};
use ts_rs::TS;

use super::catalog::{PluginCatalog, SharedCatalog};
use super::loader::{ConfigMap, ServiceConfigLoader};
use super::provider::{test_handler, InvokeOptions, ServiceDisplay, ServiceHandler, ServiceInfo, ServiceRegistry};
use crate::shared::binding::{BindingOptions, ConfigBinding};
use crate::shared::error::{AppError, AppResult};
use crate::shared::events::{AppEvent, EventBus};
use crate::shared::settings::SettingsStore;
use crate::shared::types::{Category, Language, ServiceConfig, ServiceIdentifier};

/// A row of the draggable list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../src/types/services.ts")]
pub struct VisibleEntry {
    /// Position in the full persisted list, the index drag gestures report
    pub index: usize,
    pub display: ServiceDisplay,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../src/types/services.ts")]
pub struct TranslationOutcome {
    pub identifier: ServiceIdentifier,
    pub text: Option<String>,
    pub error: Option<String>,
}

/// Move the element at `from` to `to`, keeping everything else in order
pub fn reorder<T: Clone>(list: &[T], from: usize, to: usize) -> AppResult<Vec<T>> {
    if from >= list.len() || to >= list.len() {
        return Err(AppError::Validation(format!(
            "Cannot move entry {} to {} in a list of {}",
            from,
            to,
            list.len()
        )));
    }
    let mut result = list.to_vec();
    let moved = result.remove(from);
    result.insert(to, moved);
    Ok(result)
}

/// Default persisted list for a category with nothing stored yet. Only
/// keyless providers; DeepL joins once a key passes its test.
pub fn default_service_list(category: Category) -> Vec<ServiceIdentifier> {
    match category {
        Category::Translate => vec![
            ServiceIdentifier::builtin("google"),
            ServiceIdentifier::builtin("bing"),
        ],
        _ => Vec::new(),
    }
}

/// Keeps the event listener alive; dropping it unsubscribes
pub struct ActivationGuard {
    handle: JoinHandle<()>,
}

impl ActivationGuard {
    pub fn deactivate(self) {}
}

impl Drop for ActivationGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub struct ServiceListOrchestrator {
    category: Category,
    list: ConfigBinding<Vec<ServiceIdentifier>>,
    catalog: SharedCatalog,
    configs: ServiceConfigLoader,
    registry: Arc<ServiceRegistry>,
    store: Arc<dyn SettingsStore>,
    events: EventBus,
    // Serializes read-modify-write list edits
    edit_lock: Mutex<()>,
}

impl ServiceListOrchestrator {
    pub fn new(
        category: Category,
        store: Arc<dyn SettingsStore>,
        events: EventBus,
        registry: Arc<ServiceRegistry>,
        catalog: SharedCatalog,
    ) -> Self {
        Self {
            category,
            list: ConfigBinding::new(
                category.list_key(),
                default_service_list(category),
                BindingOptions::default(),
                store.clone(),
                events.clone(),
            ),
            catalog,
            configs: ServiceConfigLoader::new(store.clone()),
            registry,
            store,
            events,
            edit_lock: Mutex::new(()),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Read the persisted list, discover plugins and load configs
    pub async fn mount(&self) {
        if let Err(e) = self.list.load().await {
            log::warn!("[Services] Failed to read {} list, using defaults: {}", self.category, e);
        }
        self.reload_catalog().await;
        self.refresh_configs().await;
        log::info!(
            "[Services] Mounted {} with {} service(s)",
            self.category,
            self.list.get().len()
        );
    }

    /// Subscribe to plugin reloads and sibling config changes until the
    /// returned guard is dropped. Must be called inside a Tokio runtime.
    pub fn activate(self: &Arc<Self>) -> ActivationGuard {
        let mut rx = self.events.subscribe();
        let this: Weak<Self> = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            loop {
                let event = match rx.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        log::warn!("[Services] Listener skipped {} events", skipped);
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                let Some(this) = this.upgrade() else { break };
                this.handle_event(&event).await;
            }
        });
        ActivationGuard { handle }
    }

    async fn handle_event(&self, event: &AppEvent) {
        match event {
            AppEvent::ReloadPluginList => self.reload_catalog().await,
            AppEvent::ConfigChanged { key, .. } => {
                if self.list.apply(event) {
                    self.refresh_configs().await;
                } else if self.list.get().iter().any(|id| id.as_str() == key) {
                    self.refresh_configs().await;
                }
            }
            AppEvent::ServiceListChanged { .. } => {}
        }
    }

    /// Rescan this list's category into the shared catalog
    pub async fn reload_catalog(&self) {
        self.catalog.reload(&[self.category]).await;
    }

    pub fn catalog(&self) -> Arc<PluginCatalog> {
        self.catalog.snapshot()
    }

    pub async fn refresh_configs(&self) -> bool {
        self.configs.refresh(&self.list.get()).await
    }

    pub fn services(&self) -> Vec<ServiceIdentifier> {
        self.list.get()
    }

    pub fn configs(&self) -> Arc<ConfigMap> {
        self.configs.current()
    }

    pub fn config(&self, identifier: &ServiceIdentifier) -> ServiceConfig {
        self.configs.config(identifier)
    }

    pub fn is_enabled(&self, identifier: &ServiceIdentifier) -> bool {
        self.configs.is_enabled(identifier)
    }

    /// Drag gesture finished. `to` is `None` when dropped outside the list.
    pub async fn reorder(&self, from: usize, to: Option<usize>) -> AppResult<()> {
        let Some(to) = to else {
            return Ok(());
        };
        let _edit = self.edit_lock.lock().await;
        let reordered = reorder(&self.list.get(), from, to)?;
        self.write_list(reordered).await
    }

    /// Append a service unless it is already listed
    pub async fn add_service(&self, identifier: ServiceIdentifier) -> AppResult<()> {
        let _edit = self.edit_lock.lock().await;
        let mut list = self.list.get();
        if list.contains(&identifier) {
            return Ok(());
        }
        list.push(identifier);
        self.write_list(list).await
    }

    pub async fn remove_service(&self, identifier: &ServiceIdentifier) -> AppResult<()> {
        let _edit = self.edit_lock.lock().await;
        let mut list = self.list.get();
        let before = list.len();
        list.retain(|id| id != identifier);
        if list.len() == before {
            return Ok(());
        }
        self.write_list(list).await
    }

    async fn write_list(&self, list: Vec<ServiceIdentifier>) -> AppResult<()> {
        self.list.set_and_sync(list.clone()).await?;
        self.events.emit(AppEvent::ServiceListChanged {
            category: self.category,
            services: list,
        });
        self.refresh_configs().await;
        Ok(())
    }

    pub fn handler(&self, identifier: &ServiceIdentifier) -> Option<ServiceHandler> {
        self.registry.resolve(self.category, identifier, &self.catalog())
    }

    /// Built-in metadata, else the plugin's, else nothing
    pub fn resolve_display(&self, identifier: &ServiceIdentifier) -> Option<ServiceDisplay> {
        self.handler(identifier).map(|handler| handler.display())
    }

    /// Enabled, resolvable services in list order
    pub fn visible_entries(&self) -> Vec<VisibleEntry> {
        let catalog = self.catalog();
        let configs = self.configs.current();
        self.list
            .get()
            .iter()
            .enumerate()
            .filter(|(_, id)| configs.get(*id).map_or(true, ServiceConfig::is_enabled))
            .filter_map(|(index, id)| {
                self.registry
                    .resolve(self.category, id, &catalog)
                    .map(|handler| VisibleEntry {
                        index,
                        display: handler.display(),
                    })
            })
            .collect()
    }

    /// Run one service with its loaded config
    pub async fn invoke(
        &self,
        identifier: &ServiceIdentifier,
        text: &str,
        from: Language,
        to: Language,
    ) -> AppResult<String> {
        let handler = self
            .handler(identifier)
            .ok_or_else(|| AppError::Validation(format!("Unknown service {}", identifier)))?;
        let options = InvokeOptions::new(self.config(identifier).merged_over(&handler.default_config()));
        handler.invoke(text, from, to, &options).await
    }

    /// Run every visible service at once; one outcome per service, list order
    pub async fn translate_all(&self, text: &str, from: Language, to: Language) -> Vec<TranslationOutcome> {
        let mut runs = JoinSet::new();
        for (position, entry) in self.visible_entries().into_iter().enumerate() {
            let identifier = entry.display.identifier;
            let Some(handler) = self.handler(&identifier) else {
                continue;
            };
            let options = InvokeOptions::new(self.config(&identifier).merged_over(&handler.default_config()));
            let text = text.to_string();
            runs.spawn(async move {
                let result = handler.invoke(&text, from, to, &options).await;
                (position, identifier, result)
            });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = runs.join_next().await {
            match joined {
                Ok((position, identifier, result)) => {
                    if let Err(e) = &result {
                        log::warn!("[Services] {} failed: {}", identifier, e);
                    }
                    outcomes.push((
                        position,
                        TranslationOutcome {
                            identifier,
                            text: result.as_ref().ok().cloned(),
                            error: result.err().map(|e| e.to_string()),
                        },
                    ));
                }
                Err(e) => log::error!("[Services] Provider task failed: {}", e),
            }
        }
        outcomes.sort_by_key(|(position, _)| *position);
        outcomes.into_iter().map(|(_, outcome)| outcome).collect()
    }

    /// Try `config` with a canned request; only on success is it saved and
    /// the service added to the list. A failure leaves everything untouched.
    pub async fn test_service_config(
        &self,
        identifier: &ServiceIdentifier,
        config: ServiceConfig,
    ) -> AppResult<String> {
        let handler = self
            .handler(identifier)
            .ok_or_else(|| AppError::Validation(format!("Unknown service {}", identifier)))?;
        let sample = test_handler(&handler, &config).await?;

        let binding = ConfigBinding::new(
            identifier.as_str(),
            ServiceConfig::new(),
            BindingOptions { sync: false },
            self.store.clone(),
            self.events.clone(),
        );
        binding.set_and_sync(config).await?;

        if self.list.get().contains(identifier) {
            self.refresh_configs().await;
        } else {
            self.add_service(identifier.clone()).await?;
        }
        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::provider::tests::EchoRunner;
    use crate::shared::settings::tests::FailingSave;
    use crate::shared::settings::{JsonFileStore, MemoryStore};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::path::Path;
    use tempfile::tempdir;

    fn ids(names: &[&str]) -> Vec<ServiceIdentifier> {
        names.iter().map(|n| ServiceIdentifier::new(*n)).collect()
    }

    fn orchestrator(store: Arc<dyn SettingsStore>, plugins_root: &Path, bus: &EventBus) -> Arc<ServiceListOrchestrator> {
        orchestrator_for(Category::Translate, store, SharedCatalog::new(plugins_root), bus)
    }

    fn orchestrator_for(
        category: Category,
        store: Arc<dyn SettingsStore>,
        catalog: SharedCatalog,
        bus: &EventBus,
    ) -> Arc<ServiceListOrchestrator> {
        let registry = ServiceRegistry::with_builtins(reqwest::Client::new(), Arc::new(EchoRunner::default()));
        Arc::new(ServiceListOrchestrator::new(category, store, bus.clone(), Arc::new(registry), catalog))
    }

    fn write_plugin(root: &Path, name: &str, display: &str) {
        write_plugin_in(root, "translate", name, display);
    }

    fn write_plugin_in(root: &Path, category: &str, name: &str, display: &str) {
        let dir = root.join(category).join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("info.json"), format!(r#"{{ "display": "{}" }}"#, display)).unwrap();
    }

    #[test]
    fn reorder_moves_one_element() {
        let list = vec!["a", "b", "c", "d"];
        assert_eq!(reorder(&list, 0, 2).unwrap(), vec!["b", "c", "a", "d"]);
        assert_eq!(reorder(&list, 3, 0).unwrap(), vec!["d", "a", "b", "c"]);
        assert_eq!(reorder(&list, 1, 1).unwrap(), list);
    }

    #[test]
    fn reorder_preserves_length_and_relative_order() {
        let list: Vec<u32> = (0..7).collect();
        for from in 0..list.len() {
            for to in 0..list.len() {
                let out = reorder(&list, from, to).unwrap();
                assert_eq!(out.len(), list.len());
                assert_eq!(out[to], list[from]);
                let rest: Vec<_> = out.iter().filter(|v| **v != list[from]).collect();
                let expected: Vec<_> = list.iter().filter(|v| **v != list[from]).collect();
                assert_eq!(rest, expected);
            }
        }
    }

    #[test]
    fn reorder_rejects_out_of_range() {
        assert!(reorder(&[1, 2], 2, 0).is_err());
        assert!(reorder(&[1, 2], 0, 2).is_err());
    }

    #[tokio::test]
    async fn drop_outside_list_is_a_no_op() {
        let root = tempdir().unwrap();
        let store: Arc<dyn SettingsStore> = Arc::new(MemoryStore::new());
        let orch = orchestrator(store.clone(), root.path(), &EventBus::new());
        orch.mount().await;

        orch.reorder(0, None).await.unwrap();

        assert_eq!(orch.services(), default_service_list(Category::Translate));
        assert_eq!(store.get("translate_service_list").await.unwrap(), None);
    }

    #[tokio::test]
    async fn reorder_round_trips_through_the_settings_file() {
        let root = tempdir().unwrap();
        let path = root.path().join("config.json");
        let store: Arc<dyn SettingsStore> = Arc::new(JsonFileStore::open(&path).await.unwrap());
        store.set("translate_service_list", json!(["deepl", "bing", "google"])).await.unwrap();
        let orch = orchestrator(store, root.path(), &EventBus::new());
        orch.mount().await;

        orch.reorder(2, Some(0)).await.unwrap();

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.get("translate_service_list").await.unwrap(),
            Some(json!(["google", "deepl", "bing"]))
        );
        assert_eq!(orch.services(), ids(&["google", "deepl", "bing"]));
    }

    #[tokio::test]
    async fn disabled_services_are_hidden_but_keep_their_slot() {
        let root = tempdir().unwrap();
        let store: Arc<dyn SettingsStore> = Arc::new(MemoryStore::new());
        store.set("translate_service_list", json!(["google", "deepl"])).await.unwrap();
        store.set("google", json!({ "enable": false })).await.unwrap();
        let orch = orchestrator(store.clone(), root.path(), &EventBus::new());
        orch.mount().await;

        assert!(!orch.is_enabled(&ServiceIdentifier::new("google")));
        assert!(orch.is_enabled(&ServiceIdentifier::new("deepl")));
        let visible: Vec<_> = orch
            .visible_entries()
            .into_iter()
            .map(|e| (e.index, e.display.identifier.to_string()))
            .collect();
        assert_eq!(visible, vec![(1, "deepl".to_string())]);

        // Re-enabling brings it back at its original position
        store.set("google", json!({ "enable": true })).await.unwrap();
        orch.refresh_configs().await;
        let visible: Vec<_> = orch.visible_entries().into_iter().map(|e| e.index).collect();
        assert_eq!(visible, vec![0, 1]);
        assert_eq!(orch.services(), ids(&["google", "deepl"]));
    }

    #[tokio::test]
    async fn configs_follow_the_list() {
        let root = tempdir().unwrap();
        let store: Arc<dyn SettingsStore> = Arc::new(MemoryStore::new());
        store.set("translate_service_list", json!(["google", "bing"])).await.unwrap();
        store.set("google", json!({ "enable": false })).await.unwrap();
        let orch = orchestrator(store, root.path(), &EventBus::new());
        orch.mount().await;

        let configs = orch.configs();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[&ServiceIdentifier::new("google")], ServiceConfig::new().with("enable", json!(false)));
        assert!(configs[&ServiceIdentifier::new("bing")].is_empty());

        // google keeps its slot, only bing renders
        assert!(orch.is_enabled(&ServiceIdentifier::new("bing")));
        let visible: Vec<_> = orch
            .visible_entries()
            .into_iter()
            .map(|e| (e.index, e.display.identifier.to_string()))
            .collect();
        assert_eq!(visible, vec![(1, "bing".to_string())]);
        assert_eq!(orch.services(), ids(&["google", "bing"]));
    }

    #[test]
    fn default_list_needs_no_keys() {
        let defaults = default_service_list(Category::Translate);
        assert_eq!(defaults, ids(&["google", "bing"]));
        assert!(!defaults.contains(&ServiceIdentifier::new("deepl")));
        assert!(default_service_list(Category::Tts).is_empty());
    }

    #[tokio::test]
    async fn plugins_render_with_their_manifest() {
        let root = tempdir().unwrap();
        write_plugin(root.path(), "[plugin]deeplx", "DeepLX");
        let store: Arc<dyn SettingsStore> = Arc::new(MemoryStore::new());
        store.set("translate_service_list", json!(["[plugin]deeplx", "[plugin]gone"])).await.unwrap();
        let orch = orchestrator(store, root.path(), &EventBus::new());
        orch.mount().await;

        let display = orch.resolve_display(&ServiceIdentifier::new("[plugin]deeplx")).unwrap();
        assert_eq!(display.title, "DeepLX");
        assert!(display.is_plugin);
        assert_eq!(orch.resolve_display(&ServiceIdentifier::new("[plugin]gone")), None);
        assert_eq!(orch.visible_entries().len(), 1);
    }

    #[tokio::test]
    async fn reload_signal_rebuilds_the_catalog() {
        let root = tempdir().unwrap();
        let bus = EventBus::new();
        let store: Arc<dyn SettingsStore> = Arc::new(MemoryStore::new());
        let orch = orchestrator(store, root.path(), &bus);
        orch.mount().await;
        assert_eq!(orch.catalog().len(Category::Translate), 0);

        write_plugin(root.path(), "[plugin]new", "New");
        // Drive the handler directly; the spawned listener is covered below
        orch.handle_event(&AppEvent::ReloadPluginList).await;
        assert_eq!(orch.catalog().len(Category::Translate), 1);
    }

    #[tokio::test]
    async fn listener_stops_when_guard_drops() {
        let root = tempdir().unwrap();
        let bus = EventBus::new();
        let orch = orchestrator(Arc::new(MemoryStore::new()), root.path(), &bus);
        orch.mount().await;

        let guard = orch.activate();
        write_plugin(root.path(), "[plugin]one", "One");
        bus.emit(AppEvent::ReloadPluginList);
        for _ in 0..100 {
            if orch.catalog().len(Category::Translate) == 1 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(orch.catalog().len(Category::Translate), 1);

        drop(guard);
        tokio::task::yield_now().await;
        write_plugin(root.path(), "[plugin]two", "Two");
        bus.emit(AppEvent::ReloadPluginList);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(orch.catalog().len(Category::Translate), 1);
    }

    #[tokio::test]
    async fn add_and_remove_services() {
        let root = tempdir().unwrap();
        let orch = orchestrator(Arc::new(MemoryStore::new()), root.path(), &EventBus::new());
        orch.mount().await;

        orch.add_service(ServiceIdentifier::new("google")).await.unwrap();
        assert_eq!(orch.services(), ids(&["google", "bing"]));

        orch.add_service(ServiceIdentifier::new("[plugin]x")).await.unwrap();
        orch.remove_service(&ServiceIdentifier::new("bing")).await.unwrap();
        assert_eq!(orch.services(), ids(&["google", "[plugin]x"]));
    }

    #[tokio::test]
    async fn failed_save_leaves_the_list_alone() {
        let root = tempdir().unwrap();
        let store = Arc::new(FailingSave::default());
        store.set("translate_service_list", json!(["deepl", "google"])).await.unwrap();
        let orch = orchestrator(store.clone(), root.path(), &EventBus::new());
        orch.mount().await;

        let err = orch.reorder(1, Some(0)).await.unwrap_err();
        assert_eq!(err, AppError::Io("disk full".to_string()));
        assert_eq!(orch.services(), ids(&["deepl", "google"]));
        assert_eq!(
            store.get("translate_service_list").await.unwrap(),
            Some(json!(["deepl", "google"]))
        );

        // The next edit starts from the persisted list, not a phantom reorder
        let x = ServiceIdentifier::new("[plugin]x");
        assert!(orch.add_service(x.clone()).await.is_err());
        assert_eq!(orch.services(), ids(&["deepl", "google"]));
        assert!(!orch.configs().contains_key(&x));
        assert!(orch.remove_service(&ServiceIdentifier::new("deepl")).await.is_err());
        assert_eq!(orch.services(), ids(&["deepl", "google"]));
    }

    #[tokio::test]
    async fn categories_share_one_catalog() {
        let root = tempdir().unwrap();
        write_plugin_in(root.path(), "translate", "[plugin]deeplx", "DeepLX");
        write_plugin_in(root.path(), "tts", "[plugin]voice", "Voice");
        let bus = EventBus::new();
        let catalog = SharedCatalog::new(root.path());
        let translate = orchestrator_for(Category::Translate, Arc::new(MemoryStore::new()), catalog.clone(), &bus);
        let tts = orchestrator_for(Category::Tts, Arc::new(MemoryStore::new()), catalog.clone(), &bus);

        translate.mount().await;
        // Each list only rescans its own category
        assert_eq!(catalog.snapshot().len(Category::Translate), 1);
        assert_eq!(catalog.snapshot().len(Category::Tts), 0);

        tts.mount().await;
        assert_eq!(translate.catalog().len(Category::Tts), 1);
        assert!(Arc::ptr_eq(&translate.catalog(), &tts.catalog()));
    }

    #[tokio::test]
    async fn successful_test_saves_config_and_lists_service() {
        let root = tempdir().unwrap();
        write_plugin(root.path(), "[plugin]echo", "Echo");
        let store: Arc<dyn SettingsStore> = Arc::new(MemoryStore::new());
        let orch = orchestrator(store.clone(), root.path(), &EventBus::new());
        orch.mount().await;

        let id = ServiceIdentifier::new("[plugin]echo");
        let config = ServiceConfig::new().with("token", json!("abc"));
        let sample = orch.test_service_config(&id, config.clone()).await.unwrap();

        assert_eq!(sample, "Echo:hello");
        assert_eq!(store.get("[plugin]echo").await.unwrap(), Some(config.clone().into_value()));
        assert!(orch.services().contains(&id));
        assert_eq!(orch.config(&id), config);
    }

    #[tokio::test]
    async fn failed_test_changes_nothing() {
        let root = tempdir().unwrap();
        write_plugin(root.path(), "[plugin]echo", "Echo");
        let store: Arc<dyn SettingsStore> = Arc::new(MemoryStore::new());
        let orch = orchestrator(store.clone(), root.path(), &EventBus::new());
        orch.mount().await;

        let id = ServiceIdentifier::new("[plugin]echo");
        let err = orch
            .test_service_config(&id, ServiceConfig::new().with("fail", json!(true)))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("test failed"));
        assert_eq!(store.get("[plugin]echo").await.unwrap(), None);
        assert!(!orch.services().contains(&id));
    }

    #[tokio::test]
    async fn translate_all_reports_per_service_outcomes_in_order() {
        let root = tempdir().unwrap();
        write_plugin(root.path(), "[plugin]a", "A");
        write_plugin(root.path(), "[plugin]b", "B");
        let store: Arc<dyn SettingsStore> = Arc::new(MemoryStore::new());
        store.set("translate_service_list", json!(["[plugin]b", "[plugin]a"])).await.unwrap();
        store.set("[plugin]a", json!({ "fail": true })).await.unwrap();
        let orch = orchestrator(store, root.path(), &EventBus::new());
        orch.mount().await;

        let outcomes = orch.translate_all("hi", Language::Auto, Language::En).await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].identifier, ServiceIdentifier::new("[plugin]b"));
        assert_eq!(outcomes[0].text.as_deref(), Some("B:hi"));
        assert_eq!(outcomes[1].identifier, ServiceIdentifier::new("[plugin]a"));
        assert!(outcomes[1].error.is_some());
    }
}
