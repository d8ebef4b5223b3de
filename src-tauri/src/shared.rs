pub mod types;
pub mod settings;
pub mod error;
pub mod events;
pub mod binding;
pub mod logging;

// Tauri event bridge
#[cfg(feature = "desktop")]
pub mod emit;
