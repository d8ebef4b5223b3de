use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use ts_rs::TS;

/// Marker that namespaces plugin-supplied services away from built-ins.
pub const PLUGIN_PREFIX: &str = "[plugin]";

/// Partition of the service namespace. Each category has its own
/// persisted service list and its own plugin directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "../../src/types/services.ts")]
pub enum Category {
    Translate,
    Tts,
    Recognize,
    Collection,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Translate,
        Category::Tts,
        Category::Recognize,
        Category::Collection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Translate => "translate",
            Category::Tts => "tts",
            Category::Recognize => "recognize",
            Category::Collection => "collection",
        }
    }

    /// Settings key holding this category's ordered service list
    pub fn list_key(&self) -> String {
        format!("{}_service_list", self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key naming a service within one category.
///
/// Built-ins use their bare name (`google`), plugins carry the
/// [`PLUGIN_PREFIX`] (`[plugin]com.example.deeplx`), so the two can never
/// collide even when a plugin directory reuses a built-in name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "../../src/types/services.ts")]
pub struct ServiceIdentifier(String);

impl ServiceIdentifier {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn builtin(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Plugin identifier for a plugin directory name, adding the prefix when missing
    pub fn plugin(name: &str) -> Self {
        if name.starts_with(PLUGIN_PREFIX) {
            Self(name.to_string())
        } else {
            Self(format!("{}{}", PLUGIN_PREFIX, name))
        }
    }

    pub fn is_plugin(&self) -> bool {
        self.0.starts_with(PLUGIN_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceIdentifier {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Persisted per-service configuration object.
///
/// Default resolution rule for enablement: a config with no `enable` key,
/// or whose `enable` is not a boolean, is enabled. Only an explicit
/// `enable: false` disables the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "../../src/types/services.ts")]
pub struct ServiceConfig(#[ts(type = "Record<string, unknown>")] Map<String, Value>);

impl ServiceConfig {
    pub const ENABLE_KEY: &'static str = "enable";

    pub fn new() -> Self {
        Self::default()
    }

    /// Interpret a raw stored value; anything but a JSON object is treated as absent
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.0
            .get(Self::ENABLE_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fill keys missing from `self` with the values of `defaults`
    pub fn merged_over(mut self, defaults: &ServiceConfig) -> Self {
        for (key, value) in &defaults.0 {
            self.0.entry(key.clone()).or_insert_with(|| value.clone());
        }
        self
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Application language keys, shared by every provider. Providers map
/// them onto their own codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../../src/types/services.ts")]
pub enum Language {
    Auto,
    ZhCn,
    ZhTw,
    En,
    Ja,
    Ko,
    Fr,
    Es,
    Ru,
    De,
    It,
    Tr,
    PtPt,
    PtBr,
    Vi,
    Id,
    Th,
    Ms,
    Ar,
    Hi,
}

impl Language {
    /// Key used in settings and plugin `language` tables
    pub fn key(&self) -> &'static str {
        match self {
            Language::Auto => "auto",
            Language::ZhCn => "zh_cn",
            Language::ZhTw => "zh_tw",
            Language::En => "en",
            Language::Ja => "ja",
            Language::Ko => "ko",
            Language::Fr => "fr",
            Language::Es => "es",
            Language::Ru => "ru",
            Language::De => "de",
            Language::It => "it",
            Language::Tr => "tr",
            Language::PtPt => "pt_pt",
            Language::PtBr => "pt_br",
            Language::Vi => "vi",
            Language::Id => "id",
            Language::Th => "th",
            Language::Ms => "ms",
            Language::Ar => "ar",
            Language::Hi => "hi",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
