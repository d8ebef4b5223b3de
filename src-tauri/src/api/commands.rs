//! Command modules for the Tauri application
//!
//! - `services`: service lists, plugin catalog, configs and translation
//! - `settings`: raw settings access for the configuration pages
//! - `window`: translate window lifecycle and pinning
//! - `system`: frontend logging

pub mod services;
pub mod settings;
pub mod system;
pub mod window;
