//! Advisory password strength scoring
//!
//! A rough checklist, not a guarantee. Generated passwords are only as strong
//! as the secret behind them.

use serde::Serialize;

const MIN_STRONG_LENGTH: usize = 12;

/// Strength level derived from the checklist score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthLevel {
    Weak,
    Medium,
    Strong,
    Excellent,
}

impl StrengthLevel {
    fn from_score(score: u8) -> Self {
        match score {
            0..=2 => StrengthLevel::Weak,
            3 => StrengthLevel::Medium,
            4 => StrengthLevel::Strong,
            _ => StrengthLevel::Excellent,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrengthLevel::Weak => "weak",
            StrengthLevel::Medium => "medium",
            StrengthLevel::Strong => "strong",
            StrengthLevel::Excellent => "excellent",
        }
    }
}

/// Individual checklist items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrengthChecks {
    pub has_upper: bool,
    pub has_lower: bool,
    pub has_number: bool,
    pub has_symbol: bool,
    pub min_length: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StrengthReport {
    pub checks: StrengthChecks,
    /// Number of checks passed, 0 to 5
    pub score: u8,
    pub level: StrengthLevel,
}

pub fn analyze(password: &str) -> StrengthReport {
    let checks = StrengthChecks {
        has_upper: password.chars().any(|c| c.is_ascii_uppercase()),
        has_lower: password.chars().any(|c| c.is_ascii_lowercase()),
        has_number: password.chars().any(|c| c.is_ascii_digit()),
        has_symbol: password.chars().any(|c| !c.is_ascii_alphanumeric()),
        min_length: password.chars().count() >= MIN_STRONG_LENGTH,
    };

    let score = [
        checks.has_upper,
        checks.has_lower,
        checks.has_number,
        checks.has_symbol,
        checks.min_length,
    ]
    .into_iter()
    .filter(|passed| *passed)
    .count() as u8;

    StrengthReport {
        checks,
        score,
        level: StrengthLevel::from_score(score),
    }
}
