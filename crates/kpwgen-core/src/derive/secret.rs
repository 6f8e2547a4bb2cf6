//! In-memory holder for the master secret

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Minimum number of characters a master secret must have
pub const MIN_SECRET_CHARS: usize = 8;

/// Master secret - automatically zeroed when dropped
#[derive(Zeroize, ZeroizeOnDrop, Default)]
pub struct MasterSecret {
    value: String,
}

impl MasterSecret {
    /// Create a new master secret
    pub fn new(value: String) -> Self {
        Self { value }
    }

    /// Get the secret value (use carefully)
    pub fn expose(&self) -> &str {
        &self.value
    }

    /// Length in characters, as seen by the user
    pub fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    /// Whether the secret is long enough to generate with
    pub fn is_acceptable(&self) -> bool {
        self.char_len() >= MIN_SECRET_CHARS
    }
}

impl From<String> for MasterSecret {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for MasterSecret {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl Clone for MasterSecret {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
        }
    }
}

impl std::fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterSecret")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expose() {
        let secret = MasterSecret::from("correct horse");
        assert_eq!(secret.expose(), "correct horse");
    }

    #[test]
    fn test_char_len_counts_characters() {
        // 7 characters, 14 bytes
        let secret = MasterSecret::from("ééééééé");
        assert_eq!(secret.char_len(), 7);
        assert!(!secret.is_acceptable());

        let secret = MasterSecret::from("12345678");
        assert!(secret.is_acceptable());
    }

    #[test]
    fn test_debug_redacted() {
        let secret = MasterSecret::from("hunter2-hunter2");
        let debug = format!("{:?}", secret);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("hunter2"));
    }
}
