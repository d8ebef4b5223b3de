//! Persistent key/value settings
//!
//! Every setting is a JSON value under a string key. The whole map lives in
//! one `config.json`; writes are last-write-wins and reach disk on `save()`.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

use crate::shared::error::{AppError, AppResult};

/// Well-known settings keys
pub mod keys {
    pub const TRANSLATE_SERVICE_LIST: &str = "translate_service_list";
    pub const RECOGNIZE_SERVICE_LIST: &str = "recognize_service_list";
    pub const TTS_SERVICE_LIST: &str = "tts_service_list";
    pub const COLLECTION_SERVICE_LIST: &str = "collection_service_list";

    pub const TRANSLATE_WINDOW_POSITION: &str = "translate_window_position";
    pub const TRANSLATE_REMEMBER_WINDOW_SIZE: &str = "translate_remember_window_size";
    pub const TRANSLATE_WINDOW_POSITION_X: &str = "translate_window_position_x";
    pub const TRANSLATE_WINDOW_POSITION_Y: &str = "translate_window_position_y";
    pub const TRANSLATE_WINDOW_WIDTH: &str = "translate_window_width";
    pub const TRANSLATE_WINDOW_HEIGHT: &str = "translate_window_height";
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<Value>>;
    async fn set(&self, key: &str, value: Value) -> AppResult<()>;
    async fn delete(&self, key: &str) -> AppResult<()>;
    async fn save(&self) -> AppResult<()>;
}

/// Settings persisted as a single JSON object on disk
pub struct JsonFileStore {
    path: PathBuf,
    values: RwLock<Map<String, Value>>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store; so is a
    /// corrupt one, which gets overwritten on the next save.
    pub async fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let values = if !path.exists() {
            Map::new()
        } else {
            let content = fs::read_to_string(&path).await
                .map_err(|e| AppError::Io(format!("Failed to read settings file: {}", e)))?;
            match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    log::warn!("[Settings] {} is not a JSON object, starting empty", path.display());
                    Map::new()
                }
                Err(e) => {
                    log::warn!("[Settings] Failed to parse {}: {}", path.display(), e);
                    Map::new()
                }
            }
        };

        log::info!("[Settings] Loaded {} keys from {}", values.len(), path.display());
        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SettingsStore for JsonFileStore {
    async fn get(&self, key: &str) -> AppResult<Option<Value>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> AppResult<()> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.values.write().await.remove(key);
        Ok(())
    }

    async fn save(&self) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await
                .map_err(|e| AppError::Io(format!("Failed to create config directory: {}", e)))?;
        }

        let content = {
            let values = self.values.read().await;
            serde_json::to_string_pretty(&*values)
                .map_err(|e| AppError::Store(format!("Failed to serialize settings: {}", e)))?
        };

        fs::write(&self.path, content).await
            .map_err(|e| AppError::Io(format!("Failed to write settings file: {}", e)))
    }
}

/// Process-local settings, nothing reaches disk
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<Map<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: Map<String, Value>) -> Self {
        Self {
            values: RwLock::new(values),
        }
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<Value>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> AppResult<()> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.values.write().await.remove(key);
        Ok(())
    }

    async fn save(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Adapter over the store managed by `tauri-plugin-store`, so the frontend
/// and the backend read and write the same file
#[cfg(feature = "desktop")]
pub struct TauriStore<R: tauri::Runtime> {
    inner: std::sync::Arc<tauri_plugin_store::Store<R>>,
}

#[cfg(feature = "desktop")]
impl<R: tauri::Runtime> TauriStore<R> {
    pub fn new(inner: std::sync::Arc<tauri_plugin_store::Store<R>>) -> Self {
        Self { inner }
    }
}

#[cfg(feature = "desktop")]
#[async_trait]
impl<R: tauri::Runtime> SettingsStore for TauriStore<R> {
    async fn get(&self, key: &str) -> AppResult<Option<Value>> {
        Ok(self.inner.get(key))
    }

    async fn set(&self, key: &str, value: Value) -> AppResult<()> {
        self.inner.set(key, value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key);
        Ok(())
    }

    async fn save(&self) -> AppResult<()> {
        self.inner.save().map_err(AppError::from)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    /// In-memory store whose disk writes always fail
    #[derive(Default)]
    pub(crate) struct FailingSave {
        inner: MemoryStore,
    }

    #[async_trait]
    impl SettingsStore for FailingSave {
        async fn get(&self, key: &str) -> AppResult<Option<Value>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: Value) -> AppResult<()> {
            self.inner.set(key, value).await
        }

        async fn delete(&self, key: &str) -> AppResult<()> {
            self.inner.delete(key).await
        }

        async fn save(&self) -> AppResult<()> {
            Err(AppError::Io("disk full".to_string()))
        }
    }

    #[tokio::test]
    async fn missing_file_opens_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("config.json")).await.unwrap();
        assert_eq!(store.get("google").await.unwrap(), None);
    }

    #[tokio::test]
    async fn saved_values_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        store.set(keys::TRANSLATE_SERVICE_LIST, json!(["google", "deepl"])).await.unwrap();
        store.save().await.unwrap();

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.get(keys::TRANSLATE_SERVICE_LIST).await.unwrap(),
            Some(json!(["google", "deepl"]))
        );
    }

    #[tokio::test]
    async fn deleted_keys_are_gone_after_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = JsonFileStore::open(&path).await.unwrap();
        store.set("google", json!({ "enable": false })).await.unwrap();
        store.save().await.unwrap();

        store.delete("google").await.unwrap();
        store.save().await.unwrap();

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(reopened.get("google").await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_file_opens_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(store.get("anything").await.unwrap(), None);
    }
}
