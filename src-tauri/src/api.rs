//! Tauri surface: managed state and the commands the webviews invoke

pub mod commands;
pub mod state;

pub use state::AppState;
