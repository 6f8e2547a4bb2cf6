//! Input parsing and validation
//!
//! Raw platform and account fields are split on runs of whitespace into
//! ordered token lists. Validation is pure and cheap, so callers simply
//! re-run it whenever any input changes.

use crate::derive::MasterSecret;
use crate::error::ValidationError;

/// Platform and account tokens that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInput {
    /// Platform tokens in input order, never empty
    pub platforms: Vec<String>,
    /// Account tokens; either empty or exactly one per platform
    pub accounts: Vec<String>,
}

impl ValidatedInput {
    /// Account paired with the platform at `index`, if accounts were given
    pub fn account_for(&self, index: usize) -> Option<&str> {
        if self.accounts.is_empty() {
            None
        } else {
            self.accounts.get(index).map(String::as_str)
        }
    }
}

/// Split a raw field into tokens, dropping empties and keeping order
pub fn split_tokens(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

/// The pairing rule: a non-empty account list must match the platform count
pub fn counts_mismatch(platforms: &[String], accounts: &[String]) -> bool {
    !accounts.is_empty() && accounts.len() != platforms.len()
}

/// Live hint for the account field, evaluated while the user types
pub fn has_count_mismatch(raw_platforms: &str, raw_accounts: &str) -> bool {
    counts_mismatch(&split_tokens(raw_platforms), &split_tokens(raw_accounts))
}

/// Validate a submission
pub fn validate(
    raw_platforms: &str,
    raw_accounts: &str,
    secret: &MasterSecret,
) -> Result<ValidatedInput, ValidationError> {
    if !secret.is_acceptable() {
        return Err(ValidationError::SecretTooShort);
    }

    let platforms = split_tokens(raw_platforms);
    if platforms.is_empty() {
        return Err(ValidationError::EmptyPlatformList);
    }

    let accounts = split_tokens(raw_accounts);
    if counts_mismatch(&platforms, &accounts) {
        return Err(ValidationError::AccountPlatformCountMismatch);
    }

    Ok(ValidatedInput {
        platforms,
        accounts,
    })
}
