//! Persisted advanced parameters
//!
//! Stores the non-secret generation parameters as a single JSON record in a
//! key-value backend. Records may carry an expiry; expiry is enforced lazily
//! when the record is read, never by a background task.

use chrono::{DateTime, Duration, DurationRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{KpwgenError, Result};
use crate::storage::KeyValueStore;

/// Storage key for the advanced parameters record
pub const ADVANCED_KEY: &str = "kpwgen:advanced:v1";

/// Schema version written into every record
pub const SCHEMA_VERSION: u32 = 1;

/// Non-secret generation parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedParams {
    /// Rotation counter, starts at 1
    pub version: u32,
    /// Target password length including prefix and suffix
    pub length: usize,
    pub prefix: String,
    pub suffix: String,
    /// Skip platform normalization
    pub raw_mode: bool,
}

impl Default for AdvancedParams {
    fn default() -> Self {
        Self {
            version: 1,
            length: 18,
            prefix: "Qx9".to_string(),
            suffix: "K7".to_string(),
            raw_mode: false,
        }
    }
}

/// Record layout in storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAdvancedRecord {
    pub schema_version: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub saved_at: DateTime<Utc>,
    /// `None` means the record never expires
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub expires_at: Option<DateTime<Utc>>,
    pub data: AdvancedParams,
}

impl StoredAdvancedRecord {
    fn is_well_formed(&self) -> bool {
        self.schema_version == SCHEMA_VERSION
            && self.expires_at.map_or(true, |exp| exp > self.saved_at)
    }
}

/// Result of reading the stored record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Nothing stored
    Empty,
    /// A live record
    Ok(StoredAdvancedRecord),
    /// The record had expired at the given instant and was removed
    Expired(DateTime<Utc>),
    /// The stored value could not be parsed and was removed
    Corrupt,
}

/// Expiry choices offered when saving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TtlChoice {
    ThreeHours,
    #[default]
    OneDay,
    TwoDays,
    Never,
}

impl TtlChoice {
    /// All choices, in menu order
    pub const ALL: [TtlChoice; 4] = [
        TtlChoice::ThreeHours,
        TtlChoice::OneDay,
        TtlChoice::TwoDays,
        TtlChoice::Never,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TtlChoice::ThreeHours => "3 hours",
            TtlChoice::OneDay => "24 hours",
            TtlChoice::TwoDays => "48 hours",
            TtlChoice::Never => "No expiry",
        }
    }

    /// Short form accepted by `FromStr`
    pub fn as_str(&self) -> &'static str {
        match self {
            TtlChoice::ThreeHours => "3h",
            TtlChoice::OneDay => "24h",
            TtlChoice::TwoDays => "48h",
            TtlChoice::Never => "none",
        }
    }

    pub fn duration(&self) -> Option<std::time::Duration> {
        const HOUR: u64 = 60 * 60;
        match self {
            TtlChoice::ThreeHours => Some(std::time::Duration::from_secs(3 * HOUR)),
            TtlChoice::OneDay => Some(std::time::Duration::from_secs(24 * HOUR)),
            TtlChoice::TwoDays => Some(std::time::Duration::from_secs(48 * HOUR)),
            TtlChoice::Never => None,
        }
    }
}

impl fmt::Display for TtlChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TtlChoice {
    type Err = KpwgenError;

    fn from_str(s: &str) -> Result<Self> {
        TtlChoice::ALL
            .into_iter()
            .find(|choice| choice.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| KpwgenError::InvalidTtl(s.to_string()))
    }
}

/// Settings store for the advanced parameters record
pub struct SettingsStore {
    storage: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    /// Create a settings store over a key-value backend
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Save parameters, expiring after `ttl` (`None` or zero: never)
    pub async fn save(
        &self,
        data: &AdvancedParams,
        ttl: Option<std::time::Duration>,
    ) -> Result<StoredAdvancedRecord> {
        self.save_at(data, ttl, Utc::now()).await
    }

    /// Save with an explicit "now"
    pub async fn save_at(
        &self,
        data: &AdvancedParams,
        ttl: Option<std::time::Duration>,
        now: DateTime<Utc>,
    ) -> Result<StoredAdvancedRecord> {
        // The record keeps millisecond precision
        let saved_at = now
            .duration_trunc(Duration::milliseconds(1))
            .unwrap_or(now);

        let expires_at = match ttl.filter(|ttl| !ttl.is_zero()) {
            Some(ttl) => {
                // Round sub-millisecond TTLs up so expiry stays after save time
                let millis = i64::try_from(ttl.as_millis().max(1))
                    .map_err(|_| KpwgenError::InvalidTtl(format!("{:?}", ttl)))?;
                let expires_at = saved_at
                    .checked_add_signed(Duration::milliseconds(millis))
                    .ok_or_else(|| KpwgenError::InvalidTtl(format!("{:?}", ttl)))?;
                Some(expires_at)
            }
            None => None,
        };

        let record = StoredAdvancedRecord {
            schema_version: SCHEMA_VERSION,
            saved_at,
            expires_at,
            data: data.clone(),
        };

        let json = serde_json::to_string(&record)?;
        self.storage.set(ADVANCED_KEY, &json).await?;

        match expires_at {
            Some(exp) => info!("Saved advanced parameters, expiring at {}", exp),
            None => info!("Saved advanced parameters without expiry"),
        }
        Ok(record)
    }

    /// Read the stored record, removing it if expired or corrupt
    pub async fn read(&self) -> Result<ReadOutcome> {
        self.read_at(Utc::now()).await
    }

    /// Read with an explicit "now"
    pub async fn read_at(&self, now: DateTime<Utc>) -> Result<ReadOutcome> {
        let Some(raw) = self.storage.get(ADVANCED_KEY).await? else {
            debug!("No saved advanced parameters");
            return Ok(ReadOutcome::Empty);
        };

        let record = match serde_json::from_str::<StoredAdvancedRecord>(&raw) {
            Ok(record) if record.is_well_formed() => record,
            _ => {
                warn!("Saved advanced parameters are corrupt, removing");
                self.storage.delete(ADVANCED_KEY).await?;
                return Ok(ReadOutcome::Corrupt);
            }
        };

        if let Some(expires_at) = record.expires_at {
            if now > expires_at {
                debug!("Saved advanced parameters expired at {}, removing", expires_at);
                self.storage.delete(ADVANCED_KEY).await?;
                return Ok(ReadOutcome::Expired(expires_at));
            }
        }

        Ok(ReadOutcome::Ok(record))
    }

    /// Saved parameters, if a live record exists
    pub async fn load_params(&self) -> Result<Option<AdvancedParams>> {
        match self.read().await? {
            ReadOutcome::Ok(record) => Ok(Some(record.data)),
            _ => Ok(None),
        }
    }

    /// Remove the record; a no-op when nothing is stored
    pub async fn clear(&self) -> Result<()> {
        self.storage.delete(ADVANCED_KEY).await?;
        debug!("Cleared advanced parameters");
        Ok(())
    }
}
