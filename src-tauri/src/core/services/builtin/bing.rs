use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::services::provider::{ConfigField, Invoke, InvokeOptions, ServiceDisplay, ServiceInfo};
use crate::shared::error::{AppError, AppResult};
use crate::shared::types::{Language, ServiceIdentifier};

pub const NAME: &str = "bing";

const AUTH_URL: &str = "https://edge.microsoft.com/translate/auth";
const TRANSLATE_URL: &str = "https://api-edge.cognitive.microsofttranslator.com/translate";

/// Microsoft translator behind Edge's built-in translation, keyless
#[derive(Clone)]
pub struct BingTranslate {
    http: Client,
}

impl BingTranslate {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    /// `None` lets the service detect the source language
    fn language_code(language: Language) -> Option<&'static str> {
        let code = match language {
            Language::Auto => return None,
            Language::ZhCn => "zh-Hans",
            Language::ZhTw => "zh-Hant",
            Language::PtPt => "pt-pt",
            Language::PtBr => "pt",
            other => other.key(),
        };
        Some(code)
    }

    fn endpoint(from: Language, to: Language) -> AppResult<String> {
        let to = Self::language_code(to)
            .ok_or_else(|| AppError::Validation("Bing needs an explicit target language".to_string()))?;
        let mut url = format!("{}?api-version=3.0&includeSentenceLength=true&to={}", TRANSLATE_URL, to);
        if let Some(from) = Self::language_code(from) {
            url.push_str("&from=");
            url.push_str(from);
        }
        Ok(url)
    }

    async fn token(&self) -> AppResult<String> {
        let res = self.http.get(AUTH_URL).send().await?;
        if !res.status().is_success() {
            return Err(AppError::Network(format!("Bing auth error: {}", res.status())));
        }
        Ok(res.text().await?)
    }
}

/// `[{ "translations": [{ "text": "...", "to": "..." }] }]`
pub fn parse_response(resp: &Value) -> AppResult<String> {
    resp.get(0)
        .and_then(|v| v.get("translations"))
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("text"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AppError::Validation("missing translation text".to_string()))
}

impl ServiceInfo for BingTranslate {
    fn identifier(&self) -> ServiceIdentifier {
        ServiceIdentifier::builtin(NAME)
    }

    fn display(&self) -> ServiceDisplay {
        ServiceDisplay {
            identifier: self.identifier(),
            title: "Bing".to_string(),
            icon: Some("logo/bing.svg".to_string()),
            is_plugin: false,
        }
    }

    fn config_fields(&self) -> Vec<ConfigField> {
        Vec::new()
    }
}

#[async_trait]
impl Invoke for BingTranslate {
    async fn invoke(
        &self,
        text: &str,
        from: Language,
        to: Language,
        _options: &InvokeOptions,
    ) -> AppResult<String> {
        let url = Self::endpoint(from, to)?;
        let token = self.token().await?;

        let res = self
            .http
            .post(url)
            .bearer_auth(token.trim())
            .json(&json!([{ "Text": text }]))
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(AppError::Network(format!("Bing API Error: {}", res.status())));
        }
        let resp: Value = res.json().await
            .map_err(|e| AppError::Validation(e.to_string()))?;
        parse_response(&resp)
    }
}
