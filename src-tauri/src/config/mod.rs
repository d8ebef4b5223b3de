//! Application paths and translate window defaults
//!
//! Centralized so the filesystem layout and the window/debounce constants
//! are not scattered across modules.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::shared::error::{AppError, AppResult};
use crate::shared::types::Category;

pub const SETTINGS_FILE: &str = "config.json";
pub const LOG_FILE: &str = "polyglot.log";
pub const PLUGINS_DIR: &str = "plugins";
pub const MANIFEST_FILE: &str = "info.json";

/// Filesystem layout rooted at the application config directory
#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
}

impl AppPaths {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn from_project_dirs() -> AppResult<Self> {
        ProjectDirs::from("com", "polyglot", "polyglot-widgets")
            .map(|dirs| Self::new(dirs.config_dir()))
            .ok_or_else(|| AppError::Io("Failed to determine config directory".to_string()))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    pub fn log_file(&self) -> PathBuf {
        self.config_dir.join(LOG_FILE)
    }

    /// `plugins/`, parent of the per-category plugin directories
    pub fn plugins_dir(&self) -> PathBuf {
        self.config_dir.join(PLUGINS_DIR)
    }

    /// `plugins/<category>/`
    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.plugins_dir().join(category.as_str())
    }
}

/// Window configuration for the floating translate window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    pub label: String,
    pub title: String,
    pub width: f64,
    pub height: f64,
    pub decorations: bool,
    pub transparent: bool,
    pub move_debounce_ms: u64,
    pub resize_debounce_ms: u64,
    pub blur_grace_ms: u64,
}

impl WindowConfig {
    pub fn translate() -> Self {
        Self {
            label: "translate".to_string(),
            title: "Translate".to_string(),
            width: 350.0,
            height: 420.0,
            decorations: false,
            transparent: true,
            move_debounce_ms: 100,
            resize_debounce_ms: 100,
            // Dragging a window on Windows fires blur then focus almost at once
            blur_grace_ms: 50,
        }
    }

    pub fn move_debounce(&self) -> Duration {
        Duration::from_millis(self.move_debounce_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn blur_grace(&self) -> Duration {
        Duration::from_millis(self.blur_grace_ms)
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::translate()
    }
}
