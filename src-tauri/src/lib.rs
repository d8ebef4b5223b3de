// Module declarations
pub mod config;
pub mod core;
pub mod shared;
pub mod system;
#[cfg(feature = "desktop")]
mod api;

#[cfg(feature = "desktop")]
use std::sync::Arc;

#[cfg(feature = "desktop")]
use tauri::Manager;
#[cfg(feature = "desktop")]
use tauri_plugin_store::StoreExt;

#[cfg(feature = "desktop")]
use crate::api::{commands, AppState};
#[cfg(feature = "desktop")]
use crate::core::services::builtin::http_client;
#[cfg(feature = "desktop")]
use crate::core::services::provider::{ServiceRegistry, UnavailableRunner};
#[cfg(feature = "desktop")]
use crate::shared::{events::EventBus, settings::{SettingsStore, TauriStore}};

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_store::Builder::default().build())
        .setup(|app| {
            let paths = config::AppPaths::from_project_dirs()?;
            if let Err(e) = shared::logging::init(&paths.log_file(), log::LevelFilter::Info) {
                eprintln!("Failed to initialise logging: {}", e);
            }
            log::info!("[Setup] Config directory: {}", paths.config_dir().display());

            let store: Arc<dyn SettingsStore> = Arc::new(TauriStore::new(app.store(paths.settings_file())?));
            let events = EventBus::new();
            let registry = Arc::new(ServiceRegistry::with_builtins(
                http_client()?,
                Arc::new(UnavailableRunner),
            ));
            // Window events arrive off the async runtime; timers need its handle
            let runtime = tauri::async_runtime::block_on(async { tokio::runtime::Handle::current() });

            app.manage(AppState::new(paths, store, events.clone(), registry, runtime));

            shared::emit::forward_to_frontend(app.handle().clone(), &events);
            shared::emit::listen_reload(app.handle(), events);

            let handle = app.handle().clone();
            tauri::async_runtime::spawn(async move {
                handle.state::<AppState>().start().await;
                if let Err(e) = commands::window::show_translate_window(&handle).await {
                    log::error!("[Setup] Failed to open translate window: {}", e);
                }
            });

            log::info!("[Setup] Polyglot widgets initialized");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::services::get_plugin_catalog,
            commands::services::reload_plugins,
            commands::services::get_service_list,
            commands::services::get_visible_services,
            commands::services::reorder_services,
            commands::services::add_service,
            commands::services::remove_service,
            commands::services::get_service_configs,
            commands::services::get_config_fields,
            commands::services::test_service_config,
            commands::services::translate_all,
            commands::settings::get_setting,
            commands::settings::set_setting,
            commands::window::open_translate_window,
            commands::window::set_translate_window_pinned,
            commands::system::log_message,
        ])
        .run(tauri::generate_context!())
        .unwrap_or_else(|e| {
            log::error!("FATAL: Failed to start Tauri application: {}", e);
            eprintln!("FATAL: Failed to start Tauri application: {}", e);
            std::process::exit(1);
        });
}
