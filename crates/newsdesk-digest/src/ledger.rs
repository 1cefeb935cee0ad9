//! Per-user category preference counters.

use std::sync::Arc;

use newsdesk_core::{CategoryLabel, PreferenceScore, PreferenceStore};

use crate::error::DigestError;

/// Records interaction signals and ranks a user's categories.
///
/// Scores are plain running counters: no decay, no normalization.
#[derive(Clone)]
pub struct PreferenceLedger {
    store: Arc<dyn PreferenceStore>,
}

impl PreferenceLedger {
    #[must_use]
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// Add `weight` to the user's score for `category`, creating the row on
    /// first interaction. Returns the new score.
    ///
    /// The store performs the increment atomically, so concurrent signals
    /// for the same pair are never lost.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::InvalidWeight`] for a zero weight,
    /// [`DigestError::InvalidUser`] for a blank user id, or
    /// [`DigestError::Store`] if the increment fails.
    pub async fn record_signal(
        &self,
        user_id: &str,
        category: CategoryLabel,
        weight: u64,
    ) -> Result<u64, DigestError> {
        if weight == 0 {
            return Err(DigestError::InvalidWeight);
        }
        if user_id.trim().is_empty() {
            return Err(DigestError::InvalidUser);
        }

        let score = self.store.increment(user_id, category, weight).await?;
        tracing::debug!(user_id, category = %category, weight, score, "preference signal recorded");
        Ok(score)
    }

    /// The user's preferences, highest score first. Equal scores keep
    /// creation order.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::Store`] if the rows cannot be read.
    pub async fn ranked_preferences(
        &self,
        user_id: &str,
    ) -> Result<Vec<PreferenceScore>, DigestError> {
        let mut rows = self.store.list_for_user(user_id).await?;
        // Stable: rows arrive oldest first, so ties stay first-created-first.
        rows.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryPreferenceStore;

    fn ledger() -> PreferenceLedger {
        PreferenceLedger::new(Arc::new(MemoryPreferenceStore::default()))
    }

    #[tokio::test]
    async fn first_signal_creates_row_at_weight() {
        let ledger = ledger();
        let score = ledger
            .record_signal("u1", CategoryLabel::Tech, 3)
            .await
            .unwrap();
        assert_eq!(score, 3);
    }

    #[tokio::test]
    async fn signals_accumulate() {
        let ledger = ledger();
        ledger.record_signal("u1", CategoryLabel::Tech, 1).await.unwrap();
        ledger.record_signal("u1", CategoryLabel::Tech, 2).await.unwrap();
        let ranked = ledger.ranked_preferences("u1").await.unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].score, 3);
    }

    #[tokio::test]
    async fn zero_weight_is_rejected() {
        let err = ledger()
            .record_signal("u1", CategoryLabel::Tech, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, DigestError::InvalidWeight));
    }

    #[tokio::test]
    async fn blank_user_is_rejected() {
        let err = ledger()
            .record_signal("  ", CategoryLabel::Tech, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, DigestError::InvalidUser));
    }

    #[tokio::test]
    async fn ranking_is_descending_with_creation_order_ties() {
        let ledger = ledger();
        ledger.record_signal("u1", CategoryLabel::World, 2).await.unwrap();
        ledger.record_signal("u1", CategoryLabel::India, 5).await.unwrap();
        ledger.record_signal("u1", CategoryLabel::Sports, 2).await.unwrap();
        ledger.record_signal("u1", CategoryLabel::Tech, 7).await.unwrap();

        let ranked: Vec<(CategoryLabel, u64)> = ledger
            .ranked_preferences("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|p| (p.category, p.score))
            .collect();

        assert_eq!(
            ranked,
            vec![
                (CategoryLabel::Tech, 7),
                (CategoryLabel::India, 5),
                (CategoryLabel::World, 2),
                (CategoryLabel::Sports, 2),
            ]
        );
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let ledger = ledger();
        ledger.record_signal("u1", CategoryLabel::Tech, 1).await.unwrap();
        assert!(ledger.ranked_preferences("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_signals_are_not_lost() {
        let ledger = ledger();
        let mut handles = Vec::new();
        for i in 0..50u64 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                ledger
                    .record_signal("u1", CategoryLabel::India, i % 3 + 1)
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let expected: u64 = (0..50u64).map(|i| i % 3 + 1).sum();
        let ranked = ledger.ranked_preferences("u1").await.unwrap();
        assert_eq!(ranked[0].score, expected);
    }
}
