use serde::{Serialize, Deserialize};
use serde_json::Value;
use tokio::sync::broadcast;
use ts_rs::TS;
use super::types::{Category, ServiceIdentifier};

/// Event name the plugin manager emits after installing or removing a plugin
pub const RELOAD_PLUGIN_LIST: &str = "reload_plugin_list";
pub const CONFIG_CHANGED: &str = "config://changed";
pub const SERVICE_LIST_CHANGED: &str = "services://list-changed";

const BUS_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "event", content = "payload")] // Tagged enum for easier frontend parsing
#[ts(export, export_to = "../../src/types/events.ts")]
pub enum AppEvent {
    #[serde(rename = "reload_plugin_list")]
    ReloadPluginList,

    #[serde(rename = "config://changed")]
    ConfigChanged {
        key: String,
        #[ts(type = "unknown")]
        value: Value,
        /// Binding instance that wrote the value
        origin: String,
    },

    #[serde(rename = "services://list-changed")]
    ServiceListChanged {
        category: Category,
        services: Vec<ServiceIdentifier>,
    },
}

impl AppEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AppEvent::ReloadPluginList => RELOAD_PLUGIN_LIST,
            AppEvent::ConfigChanged { .. } => CONFIG_CHANGED,
            AppEvent::ServiceListChanged { .. } => SERVICE_LIST_CHANGED,
        }
    }
}

/// In-process fan-out of [`AppEvent`]s. Cloning shares the channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AppEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Publish to every current subscriber. Having none is not an error.
    pub fn emit(&self, event: AppEvent) {
        log::debug!("[Events] {}", event.name());
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
