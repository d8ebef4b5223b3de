use tauri::{AppHandle, Emitter, EventId, Listener, Runtime};
use super::events::{AppEvent, EventBus, RELOAD_PLUGIN_LIST};

/// Emit an application event to all windows
pub fn emit_event<R: Runtime>(app: &AppHandle<R>, event: &AppEvent) {
    match event {
        // Originates in the webview; echoing it back would loop through the bridge
        AppEvent::ReloadPluginList => {}
        AppEvent::ConfigChanged { .. } | AppEvent::ServiceListChanged { .. } => {
            if let Err(e) = app.emit(event.name(), event) {
                log::error!("Failed to emit {}: {}", event.name(), e);
            }
        }
    }
}

/// Forward bus traffic to the webviews until the bus closes
pub fn forward_to_frontend<R: Runtime>(app: AppHandle<R>, bus: &EventBus) -> tauri::async_runtime::JoinHandle<()> {
    let mut rx = bus.subscribe();
    tauri::async_runtime::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => emit_event(&app, &event),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("[Events] Frontend bridge skipped {} events", skipped);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Re-publish the plugin manager's reload notification on the bus
pub fn listen_reload<R: Runtime>(app: &AppHandle<R>, bus: EventBus) -> EventId {
    app.listen_any(RELOAD_PLUGIN_LIST, move |_event| {
        bus.emit(AppEvent::ReloadPluginList);
    })
}
