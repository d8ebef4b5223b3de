//! Reactive binding over one settings key
//!
//! Holds the current value in memory, writes it back through the
//! [`SettingsStore`] and broadcasts changes so other bindings on the same key
//! (other windows, other components) can follow along.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::{Arc, RwLock};

use crate::shared::error::{AppError, AppResult};
use crate::shared::events::{AppEvent, EventBus};
use crate::shared::settings::SettingsStore;

#[derive(Debug, Clone, Copy)]
pub struct BindingOptions {
    /// Persist and broadcast on every `set`. Without it, values stay local
    /// until `set_and_sync` is called.
    pub sync: bool,
}

impl Default for BindingOptions {
    fn default() -> Self {
        Self { sync: true }
    }
}

pub struct ConfigBinding<T> {
    key: String,
    default: T,
    value: RwLock<T>,
    origin: String,
    options: BindingOptions,
    store: Arc<dyn SettingsStore>,
    events: EventBus,
}

impl<T> ConfigBinding<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
{
    pub fn new(
        key: impl Into<String>,
        default: T,
        options: BindingOptions,
        store: Arc<dyn SettingsStore>,
        events: EventBus,
    ) -> Self {
        Self {
            key: key.into(),
            value: RwLock::new(default.clone()),
            default,
            origin: uuid::Uuid::new_v4().to_string(),
            options,
            store,
            events,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Read the persisted value. Missing or undecodable values fall back to
    /// the default, which is not written back.
    pub async fn load(&self) -> AppResult<T> {
        let loaded = match self.store.get(&self.key).await? {
            Some(raw) => match serde_json::from_value::<T>(raw) {
                Ok(value) => value,
                Err(e) => {
                    log::warn!("[Config] Ignoring malformed value for '{}': {}", self.key, e);
                    self.default.clone()
                }
            },
            None => self.default.clone(),
        };
        self.replace(loaded.clone());
        Ok(loaded)
    }

    pub fn get(&self) -> T {
        match self.value.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub async fn set(&self, value: T) -> AppResult<()> {
        if self.options.sync {
            self.set_and_sync(value).await
        } else {
            self.replace(value);
            Ok(())
        }
    }

    /// Write, save and broadcast regardless of the sync option
    pub async fn set_and_sync(&self, value: T) -> AppResult<()> {
        let raw = serde_json::to_value(&value)
            .map_err(|e| AppError::Store(format!("Failed to serialize '{}': {}", self.key, e)))?;
        let previous = self.store.get(&self.key).await?;
        self.store.set(&self.key, raw.clone()).await?;
        if let Err(e) = self.store.save().await {
            self.restore(previous).await;
            return Err(e);
        }
        // Only a persisted value becomes visible
        self.replace(value);
        self.events.emit(AppEvent::ConfigChanged {
            key: self.key.clone(),
            value: raw,
            origin: self.origin.clone(),
        });
        Ok(())
    }

    /// Adopt a change written by another binding on the same key.
    /// Returns whether the local value changed.
    pub fn apply(&self, event: &AppEvent) -> bool {
        match event {
            AppEvent::ConfigChanged { key, value, origin }
                if key == &self.key && origin != &self.origin =>
            {
                match serde_json::from_value::<T>(value.clone()) {
                    Ok(value) => {
                        self.replace(value);
                        true
                    }
                    Err(e) => {
                        log::warn!("[Config] Ignoring remote value for '{}': {}", self.key, e);
                        false
                    }
                }
            }
            _ => false,
        }
    }

    /// Undo an unsaved write so the store keeps matching the disk
    async fn restore(&self, previous: Option<Value>) {
        let restored = match previous {
            Some(raw) => self.store.set(&self.key, raw).await,
            None => self.store.delete(&self.key).await,
        };
        if let Err(e) = restored {
            log::error!("[Config] Failed to roll back '{}': {}", self.key, e);
        }
    }

        fn replace(&self, value: T) {
        match self.value.write() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }
}
