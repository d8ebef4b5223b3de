//! Translate window rules
//!
//! Position and size are written back only after the window settles, and
//! only when the matching preference asks for it. Losing focus closes the
//! window after a short grace period unless it is pinned; regaining focus
//! inside the grace period keeps it open.

use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;

use super::debounce::Debouncer;
use crate::config::WindowConfig;
use crate::shared::error::AppResult;
use crate::shared::settings::{keys, SettingsStore};

/// `translate_window_position` value that restores the last position
pub const POSITION_PRE_STATE: &str = "pre_state";

pub trait WindowCloser: Send + Sync {
    fn close(&self) -> AppResult<()>;
}

pub struct TranslateWindowTracker {
    store: Arc<dyn SettingsStore>,
    closer: Arc<dyn WindowCloser>,
    pinned: AtomicBool,
    moves: Debouncer,
    resizes: Debouncer,
    blur: Debouncer,
}

impl TranslateWindowTracker {
    pub fn new(
        config: &WindowConfig,
        store: Arc<dyn SettingsStore>,
        closer: Arc<dyn WindowCloser>,
        runtime: Handle,
    ) -> Self {
        Self {
            store,
            closer,
            pinned: AtomicBool::new(false),
            moves: Debouncer::new(config.move_debounce(), runtime.clone()),
            resizes: Debouncer::new(config.resize_debounce(), runtime.clone()),
            blur: Debouncer::new(config.blur_grace(), runtime),
        }
    }

    /// Logical position after a move
    pub fn on_moved(&self, x: f64, y: f64) {
        let store = self.store.clone();
        self.moves.schedule(async move {
            let remember = matches!(
                store.get(keys::TRANSLATE_WINDOW_POSITION).await,
                Ok(Some(Value::String(ref mode))) if mode == POSITION_PRE_STATE
            );
            if !remember {
                return;
            }
            if let Err(e) = write_pair(
                store.as_ref(),
                (keys::TRANSLATE_WINDOW_POSITION_X, x),
                (keys::TRANSLATE_WINDOW_POSITION_Y, y),
            )
            .await
            {
                log::warn!("[Window] Failed to save position: {}", e);
            }
        });
    }

    /// Logical size after a resize
    pub fn on_resized(&self, width: f64, height: f64) {
        let store = self.store.clone();
        self.resizes.schedule(async move {
            let remember = matches!(
                store.get(keys::TRANSLATE_REMEMBER_WINDOW_SIZE).await,
                Ok(Some(Value::Bool(true)))
            );
            if !remember {
                return;
            }
            if let Err(e) = write_pair(
                store.as_ref(),
                (keys::TRANSLATE_WINDOW_WIDTH, width),
                (keys::TRANSLATE_WINDOW_HEIGHT, height),
            )
            .await
            {
                log::warn!("[Window] Failed to save size: {}", e);
            }
        });
    }

    pub fn on_blur(&self) {
        if self.is_pinned() {
            return;
        }
        let closer = self.closer.clone();
        self.blur.schedule(async move {
            if let Err(e) = closer.close() {
                log::error!("[Window] Failed to close translate window: {}", e);
            }
        });
    }

    pub fn on_focus(&self) {
        if self.blur.cancel() {
            log::debug!("[Window] Focus regained, close cancelled");
        }
    }

    pub fn set_pinned(&self, pinned: bool) {
        self.pinned.store(pinned, Ordering::SeqCst);
        if pinned {
            self.blur.cancel();
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned.load(Ordering::SeqCst)
    }
}

/// Whole logical pixels, fractions truncated
fn pixels(value: f64) -> Value {
    Value::from(value.trunc() as i64)
}

async fn write_pair(store: &dyn SettingsStore, first: (&str, f64), second: (&str, f64)) -> AppResult<()> {
    store.set(first.0, pixels(first.1)).await?;
    store.set(second.0, pixels(second.1)).await?;
    store.save().await
}
