//! Deterministic password derivation
//!
//! This module provides:
//! - The `Derivation` trait consumed by the generation orchestrator
//! - `HmacDerivation`, an HMAC-SHA256 implementation of it
//! - Platform name normalization
//! - `MasterSecret`, a zeroize-on-drop holder for the secret

mod hmac_sha256;
mod normalize;
mod secret;

pub use hmac_sha256::HmacDerivation;
pub use normalize::normalize_platform;
pub use secret::{MasterSecret, MIN_SECRET_CHARS};

use crate::error::DerivationError;

/// Inputs to a single password derivation
#[derive(Debug, Clone, Copy)]
pub struct DerivationInput<'a> {
    pub secret: &'a MasterSecret,
    pub platform: &'a str,
    pub account: Option<&'a str>,
    pub version: u32,
    pub target_length: usize,
    pub prefix: &'a str,
    pub suffix: &'a str,
    /// Whether the primitive should canonicalize the platform itself
    pub normalize: bool,
}

/// A pure, deterministic password derivation primitive.
///
/// Implementations must return identical output for identical input, and
/// `normalize` must be idempotent.
pub trait Derivation: Send + Sync {
    /// Reduce a platform identifier to its canonical name
    fn normalize(&self, platform: &str) -> String;

    /// Derive the password for one platform
    fn generate(&self, input: &DerivationInput<'_>) -> Result<String, DerivationError>;
}
