use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::core::services::provider::{ConfigField, Invoke, InvokeOptions, ServiceDisplay, ServiceInfo};
use crate::shared::error::{AppError, AppResult};
use crate::shared::types::{Language, ServiceIdentifier};

pub const NAME: &str = "deepl";

const FREE_HOST: &str = "https://api-free.deepl.com";
const PRO_HOST: &str = "https://api.deepl.com";

#[derive(Clone)]
pub struct DeeplTranslate {
    http: Client,
}

impl DeeplTranslate {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    /// Free-tier keys end in `:fx` and only work against the free host
    fn host(auth_key: &str) -> &'static str {
        if auth_key.ends_with(":fx") {
            FREE_HOST
        } else {
            PRO_HOST
        }
    }

    /// `None` means auto-detect
    fn source_code(language: Language) -> AppResult<Option<&'static str>> {
        let code = match language {
            Language::Auto => return Ok(None),
            Language::ZhCn | Language::ZhTw => "ZH",
            Language::PtPt | Language::PtBr => "PT",
            other => Self::common_code(other)?,
        };
        Ok(Some(code))
    }

    fn target_code(language: Language) -> AppResult<&'static str> {
        match language {
            Language::Auto => Err(AppError::Validation("DeepL needs an explicit target language".to_string())),
            Language::ZhCn => Ok("ZH-HANS"),
            Language::ZhTw => Ok("ZH-HANT"),
            Language::En => Ok("EN-US"),
            Language::PtPt => Ok("PT-PT"),
            Language::PtBr => Ok("PT-BR"),
            other => Self::common_code(other),
        }
    }

    fn common_code(language: Language) -> AppResult<&'static str> {
        match language {
            Language::En => Ok("EN"),
            Language::Ja => Ok("JA"),
            Language::Ko => Ok("KO"),
            Language::Fr => Ok("FR"),
            Language::Es => Ok("ES"),
            Language::Ru => Ok("RU"),
            Language::De => Ok("DE"),
            Language::It => Ok("IT"),
            Language::Tr => Ok("TR"),
            Language::Id => Ok("ID"),
            Language::Ar => Ok("AR"),
            other => Err(AppError::Validation(format!("DeepL does not support {}", other))),
        }
    }
}

/// Text of the first translation in a `/v2/translate` response
pub fn parse_response(resp: &Value) -> AppResult<String> {
    resp.get("translations")
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("text"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AppError::Validation("missing translation text".to_string()))
}

impl ServiceInfo for DeeplTranslate {
    fn identifier(&self) -> ServiceIdentifier {
        ServiceIdentifier::builtin(NAME)
    }

    fn display(&self) -> ServiceDisplay {
        ServiceDisplay {
            identifier: self.identifier(),
            title: "DeepL".to_string(),
            icon: Some("logo/deepl.svg".to_string()),
            is_plugin: false,
        }
    }

    fn config_fields(&self) -> Vec<ConfigField> {
        vec![ConfigField::secret("auth_key", "Auth Key")]
    }
}

#[async_trait]
impl Invoke for DeeplTranslate {
    async fn invoke(
        &self,
        text: &str,
        from: Language,
        to: Language,
        options: &InvokeOptions,
    ) -> AppResult<String> {
        let auth_key = options
            .config
            .get_str("auth_key")
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| AppError::Validation("Missing DeepL auth key".to_string()))?;

        let mut form: Vec<(&str, &str)> = vec![("text", text), ("target_lang", Self::target_code(to)?)];
        if let Some(source) = Self::source_code(from)? {
            form.push(("source_lang", source));
        }

        let res = self
            .http
            .post(format!("{}/v2/translate", Self::host(auth_key)))
            .header("Authorization", format!("DeepL-Auth-Key {}", auth_key))
            .form(&form)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(AppError::Network(format!("DeepL API Error: {}", res.status())));
        }
        let resp: Value = res.json().await
            .map_err(|e| AppError::Validation(e.to_string()))?;
        parse_response(&resp)
    }
}
