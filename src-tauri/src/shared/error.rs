use thiserror::Error;
use serde::Serialize;

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum AppError {
    #[error("I/O Error: {0}")]
    Io(String),

    #[error("Store Error: {0}")]
    Store(String),

    #[error("Manifest Error: {0}")]
    Manifest(String),

    #[error("Network Error: {0}")]
    Network(String),

    #[error("Provider Error: {0}")]
    Provider(String),

    #[error("Validation Error: {0}")]
    Validation(String),

    #[error("Plugin Error: {0}")]
    Plugin(String),

    #[error("Unknown Error: {0}")]
    Unknown(String),
}

// Implement conversion from standard errors
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("Serialization error: {}", err))
    }
}

#[cfg(feature = "desktop")]
impl From<tauri::Error> for AppError {
    fn from(err: tauri::Error) -> Self {
        AppError::Unknown(err.to_string())
    }
}

#[cfg(feature = "desktop")]
impl From<tauri_plugin_store::Error> for AppError {
    fn from(err: tauri_plugin_store::Error) -> Self {
        AppError::Store(err.to_string())
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Unknown(err)
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Unknown(err.to_string())
    }
}

// Helper for Tauri Result
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_render_readable_message() {
        let err = AppError::Provider("test failed: timeout".to_string());
        assert_eq!(err.to_string(), "Provider Error: test failed: timeout");
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "info.json");
        assert!(matches!(AppError::from(io), AppError::Io(msg) if msg.contains("info.json")));
    }
}
