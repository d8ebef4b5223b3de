use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::core::services::provider::{ConfigField, Invoke, InvokeOptions, ServiceDisplay, ServiceInfo};
use crate::shared::error::{AppError, AppResult};
use crate::shared::types::{Language, ServiceIdentifier};

pub const NAME: &str = "google";
pub const DEFAULT_URL: &str = "https://translate.google.com";

#[derive(Clone)]
pub struct GoogleTranslate {
    http: Client,
}

impl GoogleTranslate {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    fn language_code(language: Language) -> &'static str {
        match language {
            Language::Auto => "auto",
            Language::ZhCn => "zh-CN",
            Language::ZhTw => "zh-TW",
            Language::PtPt => "pt-PT",
            Language::PtBr => "pt",
            other => other.key(),
        }
    }

    fn endpoint(options: &InvokeOptions, from: Language, to: Language, text: &str) -> String {
        let base = options
            .config
            .get_str("custom_url")
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_URL)
            .trim_end_matches('/');
        format!(
            "{}/translate_a/single?client=gtx&sl={}&tl={}&hl={}&dt=t&q={}",
            base,
            Self::language_code(from),
            Self::language_code(to),
            Self::language_code(to),
            urlencoding::encode(text)
        )
    }
}

/// Join the sentence segments of a `translate_a/single` response:
/// `[[["Translated", "Original", ...], ...], ...]`
pub fn parse_response(raw: &Value) -> AppResult<String> {
    let sentences = raw
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::Validation("Invalid response format from Google".to_string()))?;

    let mut result = String::new();
    for sentence in sentences {
        if let Some(segment) = sentence.get(0).and_then(Value::as_str) {
            result.push_str(segment);
        }
    }
    Ok(result)
}

impl ServiceInfo for GoogleTranslate {
    fn identifier(&self) -> ServiceIdentifier {
        ServiceIdentifier::builtin(NAME)
    }

    fn display(&self) -> ServiceDisplay {
        ServiceDisplay {
            identifier: self.identifier(),
            title: "Google".to_string(),
            icon: Some("logo/google.svg".to_string()),
            is_plugin: false,
        }
    }

    fn config_fields(&self) -> Vec<ConfigField> {
        vec![ConfigField::input("custom_url", "Custom URL", Value::String(DEFAULT_URL.to_string()))]
    }
}

#[async_trait]
impl Invoke for GoogleTranslate {
    async fn invoke(
        &self,
        text: &str,
        from: Language,
        to: Language,
        options: &InvokeOptions,
    ) -> AppResult<String> {
        let url = Self::endpoint(options, from, to, text);
        log::debug!("[Google] Translating {} chars {} -> {}", text.chars().count(), from, to);

        let res = self.http.get(&url).send().await?;
        if !res.status().is_success() {
            return Err(AppError::Network(format!("Google API Error: {}", res.status())));
        }
        let raw: Value = res.json().await
            .map_err(|e| AppError::Validation(format!("Failed to parse JSON: {}", e)))?;
        parse_response(&raw)
    }
}
