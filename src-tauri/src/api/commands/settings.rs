//! Raw settings access
//!
//! Writes go through the shared store and are broadcast, so every list and
//! binding watching the key picks them up.

use serde_json::Value;
use tauri::State;

use crate::api::AppState;
use crate::shared::error::AppResult;
use crate::shared::events::AppEvent;
use crate::shared::settings::SettingsStore;

/// Origin tag for writes made through these commands
const WEBVIEW_ORIGIN: &str = "webview";

#[tauri::command]
pub async fn get_setting(state: State<'_, AppState>, key: String) -> AppResult<Option<Value>> {
    state.store.get(&key).await
}

#[tauri::command]
pub async fn set_setting(state: State<'_, AppState>, key: String, value: Value) -> AppResult<()> {
    state.store.set(&key, value.clone()).await?;
    state.store.save().await?;
    state.events.emit(AppEvent::ConfigChanged {
        key,
        value,
        origin: WEBVIEW_ORIGIN.to_string(),
    });
    Ok(())
}
