//! Service list management
//!
//! - `catalog`: plugin discovery on disk
//! - `provider`: the provider contract and the built-in/plugin registry
//! - `builtin`: providers shipped with the app
//! - `loader`: per-service config loading
//! - `orchestrator`: the ordered, persisted list tying the above together

pub mod provider;
pub mod builtin;
pub mod catalog;
pub mod loader;
pub mod orchestrator;

pub use orchestrator::{ActivationGuard, ServiceListOrchestrator, TranslationOutcome, VisibleEntry};
pub use provider::{ServiceDisplay, ServiceRegistry};
