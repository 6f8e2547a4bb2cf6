//! Generator session
//!
//! Holds what a front end shows: the current inputs, the last results or
//! error, the history and the clipboard indicator. Any input change clears
//! the displayed results, error and copied indicator, so results are never
//! shown next to inputs that produced something else.

use std::sync::Arc;
use tracing::debug;

use crate::clipboard::Clipboard;
use crate::derive::{Derivation, MasterSecret};
use crate::error::Result;
use crate::export::{self, ExportFormat};
use crate::generator::{GenerationRequest, GenerationResult, Generator};
use crate::history::{HistoryEntry, HistoryStore};
use crate::input;
use crate::settings::AdvancedParams;

/// Interactive generation session
pub struct GeneratorSession {
    generator: Generator,
    clipboard: Option<Clipboard>,
    secret: MasterSecret,
    platform_text: String,
    account_text: String,
    params: AdvancedParams,
    results: Vec<GenerationResult>,
    error: Option<String>,
}

impl GeneratorSession {
    /// Create a session with default parameters and empty inputs
    pub fn new(derivation: Arc<dyn Derivation>) -> Self {
        Self {
            generator: Generator::new(derivation),
            clipboard: None,
            secret: MasterSecret::default(),
            platform_text: String::new(),
            account_text: String::new(),
            params: AdvancedParams::default(),
            results: Vec::new(),
            error: None,
        }
    }

    /// Attach a clipboard for `copy`
    pub fn with_clipboard(mut self, clipboard: Clipboard) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub async fn set_secret(&mut self, secret: MasterSecret) {
        self.secret = secret;
        self.inputs_changed().await;
    }

    pub async fn set_platforms(&mut self, text: impl Into<String>) {
        self.platform_text = text.into();
        self.inputs_changed().await;
    }

    pub async fn set_accounts(&mut self, text: impl Into<String>) {
        self.account_text = text.into();
        self.inputs_changed().await;
    }

    /// Replace the advanced parameters (edits or a saved record)
    pub async fn apply_params(&mut self, params: AdvancedParams) {
        self.params = params;
        self.inputs_changed().await;
    }

    async fn inputs_changed(&mut self) {
        self.results.clear();
        self.error = None;
        if let Some(clipboard) = &self.clipboard {
            clipboard.reset().await;
        }
    }

    pub fn params(&self) -> &AdvancedParams {
        &self.params
    }

    /// Whether the form has enough to attempt a submission
    pub fn is_ready(&self) -> bool {
        self.secret.is_acceptable() && !input::split_tokens(&self.platform_text).is_empty()
    }

    /// Live account/platform count warning
    pub fn mismatch_hint(&self) -> bool {
        input::has_count_mismatch(&self.platform_text, &self.account_text)
    }

    /// Validate and generate from the current inputs.
    ///
    /// On failure the user-facing message is kept in `error()` as well.
    pub async fn submit(&mut self) -> Result<&[GenerationResult]> {
        self.inputs_changed().await;

        let outcome = match GenerationRequest::new(
            self.secret.clone(),
            &self.platform_text,
            &self.account_text,
            self.params.clone(),
        ) {
            Ok(request) => self.generator.generate(request).await,
            Err(e) => Err(e.into()),
        };

        match outcome {
            Ok(results) => {
                self.results = results;
                Ok(&self.results)
            }
            Err(e) => {
                debug!("Submission rejected: {}", e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn results(&self) -> &[GenerationResult] {
        &self.results
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn history(&self) -> &HistoryStore {
        self.generator.history()
    }

    pub async fn clear_history(&self) {
        self.history().clear().await;
    }

    /// Render the whole history in `format`
    pub async fn export(&self, format: ExportFormat) -> String {
        format.render(&self.history().all().await)
    }

    pub async fn export_filename(&self) -> String {
        export::filename(&self.history().all().await)
    }

    /// Snapshot of history, most recent first
    pub async fn history_entries(&self) -> Vec<HistoryEntry> {
        self.history().all().await
    }

    /// Copy a value; returns false without a clipboard or when both backends fail
    pub async fn copy(&self, value: &str) -> bool {
        match &self.clipboard {
            Some(clipboard) => clipboard.copy(value).await,
            None => false,
        }
    }

    pub async fn copied_value(&self) -> Option<String> {
        match &self.clipboard {
            Some(clipboard) => clipboard.copied_value().await,
            None => None,
        }
    }
}
