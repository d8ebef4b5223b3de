//! Translate window lifecycle
//!
//! The window is created on demand. Each window gets its own
//! [`TranslateWindowTracker`], dropped again when the window is destroyed.

use serde_json::Value;
use std::sync::Arc;
use tauri::{AppHandle, Manager, Runtime, State, WebviewUrl, WebviewWindow, WebviewWindowBuilder, WindowEvent};

use crate::api::AppState;
use crate::config::WindowConfig;
use crate::shared::error::{AppError, AppResult};
use crate::shared::settings::{keys, SettingsStore};
use crate::system::window::tracker::POSITION_PRE_STATE;
use crate::system::window::{TranslateWindowTracker, WindowCloser};

struct WebviewCloser<R: Runtime>(WebviewWindow<R>);

impl<R: Runtime> WindowCloser for WebviewCloser<R> {
    fn close(&self) -> AppResult<()> {
        self.0.close().map_err(AppError::from)
    }
}

async fn stored_f64(store: &dyn SettingsStore, key: &str) -> Option<f64> {
    store.get(key).await.ok().flatten().as_ref().and_then(Value::as_f64)
}

/// Saved position and size, when the preferences ask for them
async fn restored_geometry(store: &dyn SettingsStore, config: &WindowConfig) -> (Option<(f64, f64)>, (f64, f64)) {
    let restore_position = matches!(
        store.get(keys::TRANSLATE_WINDOW_POSITION).await,
        Ok(Some(Value::String(ref mode))) if mode == POSITION_PRE_STATE
    );
    let position = if restore_position {
        match (
            stored_f64(store, keys::TRANSLATE_WINDOW_POSITION_X).await,
            stored_f64(store, keys::TRANSLATE_WINDOW_POSITION_Y).await,
        ) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        }
    } else {
        None
    };

    let remember_size = matches!(
        store.get(keys::TRANSLATE_REMEMBER_WINDOW_SIZE).await,
        Ok(Some(Value::Bool(true)))
    );
    let mut size = (config.width, config.height);
    if remember_size {
        if let (Some(w), Some(h)) = (
            stored_f64(store, keys::TRANSLATE_WINDOW_WIDTH).await,
            stored_f64(store, keys::TRANSLATE_WINDOW_HEIGHT).await,
        ) {
            size = (w, h);
        }
    }
    (position, size)
}

/// Focus the translate window, creating it first if needed
pub async fn show_translate_window<R: Runtime>(app: &AppHandle<R>) -> AppResult<()> {
    let config = WindowConfig::translate();
    if let Some(window) = app.get_webview_window(&config.label) {
        window.show()?;
        window.set_focus()?;
        return Ok(());
    }

    let state = app.state::<AppState>();
    let (position, (width, height)) = restored_geometry(state.store.as_ref(), &config).await;

    let mut builder = WebviewWindowBuilder::new(
        app,
        &config.label,
        WebviewUrl::App(format!("index.html?window={}", config.label).into()),
    )
    .title(&config.title)
    .inner_size(width, height)
    .decorations(config.decorations)
    .transparent(config.transparent)
    .skip_taskbar(true)
    .focused(true);
    builder = match position {
        Some((x, y)) => builder.position(x, y),
        None => builder.center(),
    };
    let window = builder.build()?;

    let tracker = Arc::new(TranslateWindowTracker::new(
        &config,
        state.store.clone(),
        Arc::new(WebviewCloser(window.clone())),
        state.runtime.clone(),
    ));
    state.set_tracker(Some(tracker.clone()));
    wire_window_events(app.clone(), window, tracker);
    log::info!("[Window] Translate window created at {:?} {}x{}", position, width, height);
    Ok(())
}

fn wire_window_events<R: Runtime>(app: AppHandle<R>, window: WebviewWindow<R>, tracker: Arc<TranslateWindowTracker>) {
    let observed = window.clone();
    window.on_window_event(move |event| {
        let scale = observed.scale_factor().unwrap_or(1.0);
        match event {
            WindowEvent::Moved(position) => {
                let logical = position.to_logical::<f64>(scale);
                tracker.on_moved(logical.x, logical.y);
            }
            WindowEvent::Resized(size) => {
                let logical = size.to_logical::<f64>(scale);
                tracker.on_resized(logical.width, logical.height);
            }
            WindowEvent::Focused(true) => tracker.on_focus(),
            WindowEvent::Focused(false) => tracker.on_blur(),
            WindowEvent::Destroyed => app.state::<AppState>().set_tracker(None),
            _ => {}
        }
    });
}

#[tauri::command]
pub async fn open_translate_window(app: AppHandle) -> AppResult<()> {
    show_translate_window(&app).await
}

/// Pinned windows stay on top and ignore blur
#[tauri::command]
pub async fn set_translate_window_pinned(app: AppHandle, state: State<'_, AppState>, pinned: bool) -> AppResult<()> {
    if let Some(tracker) = state.tracker() {
        tracker.set_pinned(pinned);
    }
    if let Some(window) = app.get_webview_window(&WindowConfig::translate().label) {
        window.set_always_on_top(pinned)?;
    }
    Ok(())
}
