//! In-process preference and digest stores.
//!
//! Same contract as the Postgres stores: increments and digest inserts
//! happen under one lock, so they are atomic with respect to each other.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use newsdesk_core::{
    CategoryLabel, DigestInsert, DigestRecord, DigestStore, PreferenceScore, PreferenceStore,
    StoreError,
};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    /// Insertion order is creation order.
    rows: Mutex<Vec<PreferenceScore>>,
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn increment(
        &self,
        user_id: &str,
        category: CategoryLabel,
        weight: u64,
    ) -> Result<u64, StoreError> {
        let mut rows = self.rows.lock().await;

        if let Some(row) = rows
            .iter_mut()
            .find(|r| r.user_id == user_id && r.category == category)
        {
            row.score = row.score.saturating_add(weight);
            return Ok(row.score);
        }

        rows.push(PreferenceScore {
            user_id: user_id.to_string(),
            category,
            score: weight,
            created_at: Utc::now(),
        });
        Ok(weight)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<PreferenceScore>, StoreError> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().filter(|r| r.user_id == user_id).cloned().collect())
    }
}

#[derive(Debug, Default)]
pub struct MemoryDigestStore {
    digests: Mutex<HashMap<(String, NaiveDate), DigestRecord>>,
}

#[async_trait]
impl DigestStore for MemoryDigestStore {
    async fn get(&self, user_id: &str, date: NaiveDate) -> Result<Option<DigestRecord>, StoreError> {
        let digests = self.digests.lock().await;
        Ok(digests.get(&(user_id.to_string(), date)).cloned())
    }

    async fn insert_if_absent(&self, record: DigestRecord) -> Result<DigestInsert, StoreError> {
        let mut digests = self.digests.lock().await;
        let key = (record.user_id.clone(), record.date);
        if let Some(existing) = digests.get(&key) {
            return Ok(DigestInsert::Existing(existing.clone()));
        }
        digests.insert(key, record.clone());
        Ok(DigestInsert::Inserted(record))
    }

    async fn latest(&self, user_id: &str) -> Result<Option<DigestRecord>, StoreError> {
        let digests = self.digests.lock().await;
        Ok(digests
            .values()
            .filter(|d| d.user_id == user_id)
            .max_by_key(|d| (d.date, d.created_at))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest(user: &str, date: NaiveDate) -> DigestRecord {
        DigestRecord {
            user_id: user.to_string(),
            date,
            articles: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[tokio::test]
    async fn second_insert_for_same_day_returns_existing() {
        let store = MemoryDigestStore::default();
        let first = digest("u1", day(4));
        assert!(matches!(
            store.insert_if_absent(first.clone()).await.unwrap(),
            DigestInsert::Inserted(_)
        ));

        let mut second = digest("u1", day(4));
        second.articles.push(newsdesk_core::ArticleRecord::new("S", "T", "https://x/1"));
        match store.insert_if_absent(second).await.unwrap() {
            DigestInsert::Existing(record) => assert_eq!(record, first),
            DigestInsert::Inserted(_) => panic!("expected existing digest"),
        }
    }

    #[tokio::test]
    async fn latest_picks_most_recent_date() {
        let store = MemoryDigestStore::default();
        store.insert_if_absent(digest("u1", day(2))).await.unwrap();
        store.insert_if_absent(digest("u1", day(5))).await.unwrap();
        store.insert_if_absent(digest("u2", day(9))).await.unwrap();

        let latest = store.latest("u1").await.unwrap().unwrap();
        assert_eq!(latest.date, day(5));
        assert!(store.latest("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn preference_rows_are_listed_oldest_first() {
        let store = MemoryPreferenceStore::default();
        store.increment("u1", CategoryLabel::World, 1).await.unwrap();
        store.increment("u1", CategoryLabel::Tech, 1).await.unwrap();
        store.increment("u1", CategoryLabel::World, 1).await.unwrap();

        let rows = store.list_for_user("u1").await.unwrap();
        let cats: Vec<CategoryLabel> = rows.iter().map(|r| r.category).collect();
        assert_eq!(cats, vec![CategoryLabel::World, CategoryLabel::Tech]);
        assert_eq!(rows[0].score, 2);
    }
}
