//! Uniform provider contract with enum dispatch
//!
//! Every service, built-in or plugin, is a [`ServiceHandler`] variant.
//! Sync capabilities (display metadata, config form) go through
//! `enum_dispatch`; `invoke` is async and dispatched by hand, since
//! enum_dispatch does not cover async methods.

use async_trait::async_trait;
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use ts_rs::TS;

use super::builtin::{bing::BingTranslate, deepl::DeeplTranslate, google::GoogleTranslate};
use super::catalog::{PluginCatalog, PluginManifest};
use crate::shared::error::{AppError, AppResult};
use crate::shared::types::{Category, Language, ServiceConfig, ServiceIdentifier};

/// What a list row shows for a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../src/types/services.ts")]
pub struct ServiceDisplay {
    pub identifier: ServiceIdentifier,
    pub title: String,
    pub icon: Option<String>,
    pub is_plugin: bool,
}

/// One input of a service's configuration form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../src/types/services.ts")]
pub struct ConfigField {
    pub key: String,
    pub label: String,
    pub kind: String,
    pub secret: bool,
    #[ts(type = "unknown")]
    pub default: Value,
}

impl ConfigField {
    pub fn input(key: &str, label: &str, default: Value) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind: "input".to_string(),
            secret: false,
            default,
        }
    }

    pub fn secret(key: &str, label: &str) -> Self {
        Self {
            secret: true,
            ..Self::input(key, label, Value::String(String::new()))
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InvokeOptions {
    pub config: ServiceConfig,
}

impl InvokeOptions {
    pub fn new(config: ServiceConfig) -> Self {
        Self { config }
    }
}

/// Sync capabilities, dispatched statically over every handler variant
#[enum_dispatch]
pub trait ServiceInfo {
    fn identifier(&self) -> ServiceIdentifier;

    fn display(&self) -> ServiceDisplay;

    /// Fields the configuration form renders
    fn config_fields(&self) -> Vec<ConfigField>;

    /// Config used for keys the user never set
    fn default_config(&self) -> ServiceConfig {
        let mut config = ServiceConfig::new();
        for field in self.config_fields() {
            config.insert(field.key, field.default);
        }
        config
    }
}

/// `translate(text, from, to, { config })`
#[async_trait]
pub trait Invoke: Send + Sync {
    async fn invoke(
        &self,
        text: &str,
        from: Language,
        to: Language,
        options: &InvokeOptions,
    ) -> AppResult<String>;
}

#[derive(Clone)]
#[enum_dispatch(ServiceInfo)]
pub enum BuiltinService {
    Google(GoogleTranslate),
    Bing(BingTranslate),
    Deepl(DeeplTranslate),
}

#[derive(Clone)]
#[enum_dispatch(ServiceInfo)]
pub enum ServiceHandler {
    Builtin(BuiltinService),
    Plugin(PluginService),
}

impl ServiceHandler {
    pub async fn invoke(
        &self,
        text: &str,
        from: Language,
        to: Language,
        options: &InvokeOptions,
    ) -> AppResult<String> {
        match self {
            ServiceHandler::Builtin(BuiltinService::Google(s)) => s.invoke(text, from, to, options).await,
            ServiceHandler::Builtin(BuiltinService::Bing(s)) => s.invoke(text, from, to, options).await,
            ServiceHandler::Builtin(BuiltinService::Deepl(s)) => s.invoke(text, from, to, options).await,
            ServiceHandler::Plugin(p) => p.invoke(text, from, to, options).await,
        }
    }
}

/// Arguments handed to a [`PluginRunner`], languages already mapped to the
/// plugin's own codes
pub struct PluginCall<'a> {
    pub plugin: &'a PluginManifest,
    pub text: &'a str,
    pub from: &'a str,
    pub to: &'a str,
    pub config: &'a ServiceConfig,
}

/// Executes plugin code. The sandbox itself lives outside this crate.
#[async_trait]
pub trait PluginRunner: Send + Sync {
    async fn run(&self, call: PluginCall<'_>) -> AppResult<String>;
}

/// Runner used when no plugin runtime is wired in
pub struct UnavailableRunner;

#[async_trait]
impl PluginRunner for UnavailableRunner {
    async fn run(&self, call: PluginCall<'_>) -> AppResult<String> {
        Err(AppError::Plugin(format!(
            "plugin runtime unavailable for {}",
            call.plugin.identifier
        )))
    }
}

#[derive(Clone)]
pub struct PluginService {
    manifest: PluginManifest,
    runner: Arc<dyn PluginRunner>,
}

impl PluginService {
    pub fn new(manifest: PluginManifest, runner: Arc<dyn PluginRunner>) -> Self {
        Self { manifest, runner }
    }

    pub fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    /// Plugin code for an app language. Plugins without a language table
    /// receive the app keys unchanged.
    fn language_code<'a>(&'a self, language: Language) -> AppResult<&'a str> {
        if self.manifest.language.is_empty() {
            return Ok(language.key());
        }
        self.manifest
            .language
            .get(language.key())
            .map(String::as_str)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "{} does not support language {}",
                    self.manifest.display, language
                ))
            })
    }
}

impl ServiceInfo for PluginService {
    fn identifier(&self) -> ServiceIdentifier {
        self.manifest.identifier.clone()
    }

    fn display(&self) -> ServiceDisplay {
        ServiceDisplay {
            identifier: self.manifest.identifier.clone(),
            title: self.manifest.display.clone(),
            icon: self.manifest.icon.clone(),
            is_plugin: true,
        }
    }

    fn config_fields(&self) -> Vec<ConfigField> {
        self.manifest
            .needs
            .iter()
            .map(|need| ConfigField {
                key: need.key.clone(),
                label: need.display.clone(),
                kind: need.kind.clone(),
                secret: false,
                default: Value::String(String::new()),
            })
            .collect()
    }
}

#[async_trait]
impl Invoke for PluginService {
    async fn invoke(
        &self,
        text: &str,
        from: Language,
        to: Language,
        options: &InvokeOptions,
    ) -> AppResult<String> {
        let from = self.language_code(from)?;
        let to = self.language_code(to)?;
        self.runner
            .run(PluginCall {
                plugin: &self.manifest,
                text,
                from,
                to,
                config: &options.config,
            })
            .await
    }
}

/// Built-in services per category, populated explicitly at startup, plus
/// the runner plugin handlers are created with
pub struct ServiceRegistry {
    builtins: HashMap<Category, Vec<BuiltinService>>,
    runner: Arc<dyn PluginRunner>,
}

impl ServiceRegistry {
    pub fn new(runner: Arc<dyn PluginRunner>) -> Self {
        Self {
            builtins: HashMap::new(),
            runner,
        }
    }

    /// Registry with every built-in provider shipped in this crate
    pub fn with_builtins(http: reqwest::Client, runner: Arc<dyn PluginRunner>) -> Self {
        let mut registry = Self::new(runner);
        registry.register(Category::Translate, GoogleTranslate::new(http.clone()).into());
        registry.register(Category::Translate, BingTranslate::new(http.clone()).into());
        registry.register(Category::Translate, DeeplTranslate::new(http).into());
        registry
    }

    pub fn register(&mut self, category: Category, service: BuiltinService) {
        let services = self.builtins.entry(category).or_default();
        let id = service.identifier();
        services.retain(|existing| existing.identifier() != id);
        services.push(service);
    }

    pub fn builtin(&self, category: Category, identifier: &ServiceIdentifier) -> Option<&BuiltinService> {
        if identifier.is_plugin() {
            return None;
        }
        self.builtins
            .get(&category)?
            .iter()
            .find(|service| &service.identifier() == identifier)
    }

    pub fn builtin_identifiers(&self, category: Category) -> Vec<ServiceIdentifier> {
        self.builtins
            .get(&category)
            .map(|services| services.iter().map(ServiceInfo::identifier).collect())
            .unwrap_or_default()
    }

    /// Built-in first, then the catalog. `None` for identifiers neither knows.
    pub fn resolve(
        &self,
        category: Category,
        identifier: &ServiceIdentifier,
        catalog: &PluginCatalog,
    ) -> Option<ServiceHandler> {
        if let Some(builtin) = self.builtin(category, identifier) {
            return Some(ServiceHandler::Builtin(builtin.clone()));
        }
        if !identifier.is_plugin() {
            return None;
        }
        catalog
            .get(category, identifier)
            .map(|manifest| ServiceHandler::Plugin(PluginService::new(manifest.clone(), self.runner.clone())))
    }
}

/// Canned request a configuration form sends to check a provider works
pub async fn test_handler(handler: &ServiceHandler, config: &ServiceConfig) -> AppResult<String> {
    let options = InvokeOptions::new(config.clone().merged_over(&handler.default_config()));
    handler
        .invoke("hello", Language::Auto, Language::ZhCn, &options)
        .await
        .map_err(|e| AppError::Provider(format!("test failed: {}", e)))
}
