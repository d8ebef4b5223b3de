//! Service list commands
//!
//! Thin wrappers over [`ServiceListOrchestrator`](crate::core::services::ServiceListOrchestrator).

use tauri::State;

use crate::api::AppState;
use crate::core::services::catalog::PluginCatalog;
use crate::core::services::loader::ConfigMap;
use crate::core::services::provider::{ConfigField, ServiceInfo};
use crate::core::services::{TranslationOutcome, VisibleEntry};
use crate::shared::error::{AppError, AppResult};
use crate::shared::events::AppEvent;
use crate::shared::types::{Category, Language, ServiceConfig, ServiceIdentifier};

#[tauri::command]
pub async fn get_plugin_catalog(state: State<'_, AppState>) -> AppResult<PluginCatalog> {
    Ok(state.catalog.snapshot().as_ref().clone())
}

/// Same as the plugin manager's `reload_plugin_list` signal
#[tauri::command]
pub async fn reload_plugins(state: State<'_, AppState>) -> AppResult<()> {
    state.events.emit(AppEvent::ReloadPluginList);
    Ok(())
}

#[tauri::command]
pub async fn get_service_list(state: State<'_, AppState>, category: Category) -> AppResult<Vec<ServiceIdentifier>> {
    Ok(state.orchestrator(category)?.services())
}

#[tauri::command]
pub async fn get_visible_services(state: State<'_, AppState>, category: Category) -> AppResult<Vec<VisibleEntry>> {
    Ok(state.orchestrator(category)?.visible_entries())
}

/// `to` is absent when the drag ended outside the list
#[tauri::command]
pub async fn reorder_services(
    state: State<'_, AppState>,
    category: Category,
    from: usize,
    to: Option<usize>,
) -> AppResult<()> {
    state.orchestrator(category)?.reorder(from, to).await
}

#[tauri::command]
pub async fn add_service(state: State<'_, AppState>, category: Category, identifier: ServiceIdentifier) -> AppResult<()> {
    state.orchestrator(category)?.add_service(identifier).await
}

#[tauri::command]
pub async fn remove_service(state: State<'_, AppState>, category: Category, identifier: ServiceIdentifier) -> AppResult<()> {
    state.orchestrator(category)?.remove_service(&identifier).await
}

#[tauri::command]
pub async fn get_service_configs(state: State<'_, AppState>, category: Category) -> AppResult<ConfigMap> {
    Ok(state.orchestrator(category)?.configs().as_ref().clone())
}

#[tauri::command]
pub async fn get_config_fields(
    state: State<'_, AppState>,
    category: Category,
    identifier: ServiceIdentifier,
) -> AppResult<Vec<ConfigField>> {
    state
        .orchestrator(category)?
        .handler(&identifier)
        .map(|handler| handler.config_fields())
        .ok_or_else(|| AppError::Validation(format!("Unknown service {}", identifier)))
}

#[tauri::command]
pub async fn test_service_config(
    state: State<'_, AppState>,
    category: Category,
    identifier: ServiceIdentifier,
    config: ServiceConfig,
) -> AppResult<String> {
    state
        .orchestrator(category)?
        .test_service_config(&identifier, config)
        .await
}

#[tauri::command]
pub async fn translate_all(
    state: State<'_, AppState>,
    text: String,
    from: Language,
    to: Language,
) -> AppResult<Vec<TranslationOutcome>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(state
        .orchestrator(Category::Translate)?
        .translate_all(&text, from, to)
        .await)
}
