//! Generation orchestration
//!
//! Turns a validated submission into one password per platform token, in
//! input order, and records the batch in history. A batch is all or nothing:
//! if derivation fails for any platform no results are returned and history
//! is left untouched.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::derive::{Derivation, DerivationInput, MasterSecret};
use crate::error::{KpwgenError, Result, ValidationError};
use crate::history::HistoryStore;
use crate::input::{validate, ValidatedInput};
use crate::settings::AdvancedParams;

/// One derived password
#[derive(Clone, PartialEq, Eq)]
pub struct GenerationResult {
    /// Canonical platform name (trimmed literal in raw mode)
    pub platform: String,
    pub account: Option<String>,
    pub password: String,
}

impl std::fmt::Debug for GenerationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationResult")
            .field("platform", &self.platform)
            .field("account", &self.account)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// A validated submission; the secret is dropped (and zeroed) with it
#[derive(Debug)]
pub struct GenerationRequest {
    secret: MasterSecret,
    input: ValidatedInput,
    params: AdvancedParams,
}

impl GenerationRequest {
    /// Validate raw fields into a request
    pub fn new(
        secret: MasterSecret,
        raw_platforms: &str,
        raw_accounts: &str,
        params: AdvancedParams,
    ) -> std::result::Result<Self, ValidationError> {
        let input = validate(raw_platforms, raw_accounts, &secret)?;
        Ok(Self {
            secret,
            input,
            params,
        })
    }

    pub fn platforms(&self) -> &[String] {
        &self.input.platforms
    }

    pub fn accounts(&self) -> &[String] {
        &self.input.accounts
    }

    pub fn params(&self) -> &AdvancedParams {
        &self.params
    }
}

/// Generation orchestrator
pub struct Generator {
    derivation: Arc<dyn Derivation>,
    history: HistoryStore,
}

impl Generator {
    /// Create a generator with a fresh history
    pub fn new(derivation: Arc<dyn Derivation>) -> Self {
        Self::with_history(derivation, HistoryStore::new())
    }

    /// Create a generator appending to an existing history
    pub fn with_history(derivation: Arc<dyn Derivation>, history: HistoryStore) -> Self {
        Self {
            derivation,
            history,
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Derive the batch without touching history
    pub fn derive(&self, request: &GenerationRequest) -> Result<Vec<GenerationResult>> {
        let params = &request.params;
        let mut results = Vec::with_capacity(request.input.platforms.len());

        for (index, token) in request.input.platforms.iter().enumerate() {
            let platform = if params.raw_mode {
                token.trim().to_string()
            } else {
                self.derivation.normalize(token)
            };
            let account = request.input.account_for(index);

            let input = DerivationInput {
                secret: &request.secret,
                platform: &platform,
                account,
                version: params.version,
                target_length: params.length,
                prefix: &params.prefix,
                suffix: &params.suffix,
                normalize: !params.raw_mode,
            };

            let password = self.derivation.generate(&input).map_err(|e| {
                warn!("Derivation failed for platform #{}: {}", index + 1, e);
                KpwgenError::GenerationFailed
            })?;

            results.push(GenerationResult {
                platform,
                account: account.map(str::to_string),
                password,
            });
        }

        debug!("Derived {} passwords", results.len());
        Ok(results)
    }

    /// Derive the batch and append it to history as one unit
    pub async fn generate(&self, request: GenerationRequest) -> Result<Vec<GenerationResult>> {
        let results = self.derive(&request)?;
        drop(request);

        self.history.append(&results).await;
        info!("Generated {} passwords", results.len());
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::HmacDerivation;
    use crate::error::DerivationError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and fails for one chosen platform
    #[derive(Default)]
    struct ScriptedDerivation {
        calls: AtomicUsize,
        fail_on: Option<&'static str>,
    }

    impl Derivation for ScriptedDerivation {
        fn normalize(&self, platform: &str) -> String {
            platform.trim().to_lowercase()
        }

        fn generate(
            &self,
            input: &DerivationInput<'_>,
        ) -> std::result::Result<String, DerivationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if Some(input.platform) == self.fail_on {
                return Err(DerivationError::EmptyPlatform);
            }
            Ok(format!(
                "{}|{}|{}",
                input.platform,
                input.account.unwrap_or("-"),
                input.normalize
            ))
        }
    }

    fn request(platforms: &str, accounts: &str, params: AdvancedParams) -> GenerationRequest {
        GenerationRequest::new(
            MasterSecret::from("long-enough-secret"),
            platforms,
            accounts,
            params,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_order_and_pairing() {
        let generator = Generator::new(Arc::new(ScriptedDerivation::default()));
        let results = generator
            .generate(request("P0 P1 P2", "a0 a1 a2", AdvancedParams::default()))
            .await
            .unwrap();

        let summary: Vec<(&str, Option<&str>, &str)> = results
            .iter()
            .map(|r| (r.platform.as_str(), r.account.as_deref(), r.password.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("p0", Some("a0"), "p0|a0|true"),
                ("p1", Some("a1"), "p1|a1|true"),
                ("p2", Some("a2"), "p2|a2|true"),
            ]
        );
    }

    #[tokio::test]
    async fn test_raw_mode_keeps_literal() {
        let generator = Generator::new(Arc::new(ScriptedDerivation::default()));
        let params = AdvancedParams {
            raw_mode: true,
            ..AdvancedParams::default()
        };

        let results = generator.generate(request("GitHub", "", params)).await.unwrap();
        assert_eq!(results[0].platform, "GitHub");
        assert_eq!(results[0].account, None);
        assert_eq!(results[0].password, "GitHub|-|false");
    }

    #[tokio::test]
    async fn test_failure_aborts_whole_batch() {
        let derivation = Arc::new(ScriptedDerivation {
            fail_on: Some("b"),
            ..Default::default()
        });
        let generator = Generator::new(derivation.clone());

        let result = generator
            .generate(request("a b c", "", AdvancedParams::default()))
            .await;

        assert!(matches!(result, Err(KpwgenError::GenerationFailed)));
        assert_eq!(result.unwrap_err().to_string(), "Failed to generate password.");
        assert!(generator.history().is_empty().await);
        // Stops at the failing platform
        assert_eq!(derivation.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_validation_happens_before_derivation() {
        let result = GenerationRequest::new(
            MasterSecret::from("short"),
            "google",
            "",
            AdvancedParams::default(),
        );
        assert_eq!(result.unwrap_err(), ValidationError::SecretTooShort);

        let result = GenerationRequest::new(
            MasterSecret::from("long-enough-secret"),
            "a b",
            "x",
            AdvancedParams::default(),
        );
        assert_eq!(
            result.unwrap_err(),
            ValidationError::AccountPlatformCountMismatch
        );
    }

    #[tokio::test]
    async fn test_batch_appended_with_shared_timestamp() {
        let generator = Generator::new(Arc::new(ScriptedDerivation::default()));
        generator
            .generate(request("a b", "", AdvancedParams::default()))
            .await
            .unwrap();
        generator
            .generate(request("c", "", AdvancedParams::default()))
            .await
            .unwrap();

        let all = generator.history().all().await;
        let platforms: Vec<&str> = all.iter().map(|e| e.platform.as_str()).collect();
        assert_eq!(platforms, vec!["c", "a", "b"]);
        assert_eq!(all[1].timestamp, all[2].timestamp);
        assert_eq!(all[1].batch_id, all[2].batch_id);
    }

    #[tokio::test]
    async fn test_deterministic_with_real_derivation() {
        let generator = Generator::new(Arc::new(HmacDerivation::new()));
        let params = AdvancedParams::default();

        let first = generator
            .generate(request("https://accounts.google.com", "me", params.clone()))
            .await
            .unwrap();
        let second = generator
            .generate(request("google", "me", params))
            .await
            .unwrap();

        assert_eq!(first[0].platform, "google");
        assert_eq!(first, second);
        assert_eq!(first[0].password.len(), 18);
    }

    #[test]
    fn test_debug_redacts_password() {
        let result = GenerationResult {
            platform: "google".to_string(),
            account: None,
            password: "Qx9secretK7".to_string(),
        };
        assert!(!format!("{:?}", result).contains("Qx9secretK7"));
    }
}
