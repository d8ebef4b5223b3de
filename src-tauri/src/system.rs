//! Platform-facing behaviour that does not need the webview itself

pub mod window;
