//! Floating window behaviour
//!
//! - `debounce`: cancel-and-reschedule timers on the Tokio runtime
//! - `tracker`: persistence and blur-close rules of the translate window

pub mod debounce;
pub mod tracker;

pub use debounce::Debouncer;
pub use tracker::{TranslateWindowTracker, WindowCloser};
