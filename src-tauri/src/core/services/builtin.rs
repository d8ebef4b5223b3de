//! Providers shipped with the application
//!
//! All of them translate through `reqwest`; they are registered in
//! [`ServiceRegistry::with_builtins`](super::provider::ServiceRegistry::with_builtins).

pub mod bing;
pub mod deepl;
pub mod google;

const USER_AGENT: &str = "Mozilla/5.0 (polyglot-widgets)";

/// HTTP client shared by the built-in providers
pub fn http_client() -> crate::shared::error::AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(std::time::Duration::from_secs(15))
        .build()
        .map_err(|e| crate::shared::error::AppError::Network(e.to_string()))
}
