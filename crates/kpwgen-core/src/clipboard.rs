//! Copy-to-clipboard with fallback
//!
//! Copying is a convenience: a failed primary write falls back to a second
//! backend, and a failed fallback is logged and swallowed. A successful copy
//! raises a "copied" indicator for the copied value that lapses after
//! [`COPIED_INDICATOR_TTL`].

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

/// How long the copied indicator stays up
pub const COPIED_INDICATOR_TTL: Duration = Duration::from_millis(2000);

#[derive(Error, Debug)]
#[error("{backend} clipboard failed: {reason}")]
pub struct ClipboardError {
    pub backend: &'static str,
    pub reason: String,
}

impl ClipboardError {
    pub fn new(backend: &'static str, reason: impl Into<String>) -> Self {
        Self {
            backend,
            reason: reason.into(),
        }
    }
}

/// A way of putting text on the system clipboard
#[async_trait]
pub trait ClipboardBackend: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;

    fn name(&self) -> &'static str;
}

struct CopiedIndicator {
    value: String,
    copied_at: Instant,
}

/// Clipboard with a primary and fallback backend
pub struct Clipboard {
    primary: Arc<dyn ClipboardBackend>,
    fallback: Arc<dyn ClipboardBackend>,
    indicator: RwLock<Option<CopiedIndicator>>,
}

impl Clipboard {
    pub fn new(primary: Arc<dyn ClipboardBackend>, fallback: Arc<dyn ClipboardBackend>) -> Self {
        Self {
            primary,
            fallback,
            indicator: RwLock::new(None),
        }
    }

    /// Copy `text`, returning whether any backend succeeded.
    ///
    /// Never fails; an empty `text` is ignored.
    pub async fn copy(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }

        let copied = match self.primary.write_text(text).await {
            Ok(()) => true,
            Err(e) => {
                warn!("{}, trying {}", e, self.fallback.name());
                match self.fallback.write_text(text).await {
                    Ok(()) => true,
                    Err(e) => {
                        error!("Fallback copy failed: {}", e);
                        false
                    }
                }
            }
        };

        if copied {
            *self.indicator.write().await = Some(CopiedIndicator {
                value: text.to_string(),
                copied_at: Instant::now(),
            });
            debug!("Copied value to clipboard");
        }
        copied
    }

    /// The value last copied, while its indicator is still up
    pub async fn copied_value(&self) -> Option<String> {
        self.copied_value_at(Instant::now()).await
    }

    pub async fn copied_value_at(&self, now: Instant) -> Option<String> {
        self.indicator
            .read()
            .await
            .as_ref()
            .filter(|indicator| {
                now.saturating_duration_since(indicator.copied_at) < COPIED_INDICATOR_TTL
            })
            .map(|indicator| indicator.value.clone())
    }

    /// Whether the indicator for `value` is up
    pub async fn is_copied(&self, value: &str) -> bool {
        self.copied_value().await.as_deref() == Some(value)
    }

    /// Drop the indicator
    pub async fn reset(&self) {
        *self.indicator.write().await = None;
    }
}
