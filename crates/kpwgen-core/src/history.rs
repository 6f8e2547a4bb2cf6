//! Session history of generated passwords
//!
//! Append-only, most-recent-first. Each submission is appended as one
//! contiguous batch sharing a single timestamp; the only other mutation is
//! clearing everything. Nothing here is persisted.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::generator::GenerationResult;

/// A generation result with the time its batch completed
#[derive(Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Shared by every entry appended in the same batch
    pub batch_id: Uuid,
    pub platform: String,
    pub account: Option<String>,
    pub password: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Build an entry outside of a store (exports of ad-hoc data, tests)
    pub fn new(result: GenerationResult, timestamp: DateTime<Utc>) -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            platform: result.platform,
            account: result.account,
            password: result.password,
            timestamp,
        }
    }
}

impl std::fmt::Debug for HistoryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryEntry")
            .field("batch_id", &self.batch_id)
            .field("platform", &self.platform)
            .field("account", &self.account)
            .field("password", &"[REDACTED]")
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

/// Append-only history store; clones share the same log
#[derive(Clone, Default)]
pub struct HistoryStore {
    entries: Arc<RwLock<Vec<HistoryEntry>>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a batch stamped with the current time
    pub async fn append(&self, batch: &[GenerationResult]) -> Option<Uuid> {
        self.append_at(batch, Utc::now()).await
    }

    /// Prepend a batch stamped with `timestamp`.
    ///
    /// Returns the batch id, or `None` for an empty batch (nothing stored).
    pub async fn append_at(
        &self,
        batch: &[GenerationResult],
        timestamp: DateTime<Utc>,
    ) -> Option<Uuid> {
        if batch.is_empty() {
            return None;
        }

        let batch_id = Uuid::new_v4();
        let mut block: Vec<HistoryEntry> = batch
            .iter()
            .cloned()
            .map(|result| HistoryEntry {
                batch_id,
                platform: result.platform,
                account: result.account,
                password: result.password,
                timestamp,
            })
            .collect();

        let mut entries = self.entries.write().await;
        block.append(&mut entries);
        *entries = block;

        debug!(
            "Appended batch {} ({} entries, {} total)",
            batch_id,
            batch.len(),
            entries.len()
        );
        Some(batch_id)
    }

    /// Snapshot of every entry, most recent batch first
    pub async fn all(&self) -> Vec<HistoryEntry> {
        self.entries.read().await.clone()
    }

    /// Discard every entry
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        let dropped = entries.len();
        entries.clear();
        debug!("Cleared {} history entries", dropped);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn result(platform: &str, account: Option<&str>, password: &str) -> GenerationResult {
        GenerationResult {
            platform: platform.to_string(),
            account: account.map(str::to_string),
            password: password.to_string(),
        }
    }

    fn platforms(entries: &[HistoryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.platform.as_str()).collect()
    }

    #[tokio::test]
    async fn test_batches_prepend_in_order() {
        let history = HistoryStore::new();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let t2 = t1 + Duration::minutes(5);

        let b1 = history
            .append_at(&[result("a", None, "1"), result("b", None, "2")], t1)
            .await
            .unwrap();
        let b2 = history
            .append_at(
                &[result("c", None, "3"), result("d", None, "4"), result("e", None, "5")],
                t2,
            )
            .await
            .unwrap();
        assert_ne!(b1, b2);

        let all = history.all().await;
        assert_eq!(platforms(&all), vec!["c", "d", "e", "a", "b"]);
        assert!(all[..3].iter().all(|e| e.timestamp == t2 && e.batch_id == b2));
        assert!(all[3..].iter().all(|e| e.timestamp == t1 && e.batch_id == b1));
    }

    #[tokio::test]
    async fn test_no_deduplication() {
        let history = HistoryStore::new();
        let same = [result("google", Some("me"), "pw")];

        history.append(&same).await;
        history.append(&same).await;

        assert_eq!(history.len().await, 2);
    }

    #[tokio::test]
    async fn test_empty_batch_ignored() {
        let history = HistoryStore::new();
        assert_eq!(history.append(&[]).await, None);
        assert!(history.is_empty().await);
    }

    #[tokio::test]
    async fn test_clear() {
        let history = HistoryStore::new();
        history.append(&[result("a", None, "1")]).await;

        history.clear().await;
        assert!(history.all().await.is_empty());

        // Clearing an empty history is fine
        history.clear().await;
        assert!(history.is_empty().await);
    }

    #[tokio::test]
    async fn test_clones_share_log() {
        let history = HistoryStore::new();
        let view = history.clone();

        history.append(&[result("a", None, "1")]).await;
        assert_eq!(view.len().await, 1);
    }

    #[test]
    fn test_debug_redacts_password() {
        let entry = HistoryEntry::new(result("google", None, "s3cr3t-pw"), Utc::now());
        let debug = format!("{:?}", entry);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("s3cr3t-pw"));
    }
}
