//! Storage contracts consumed by the ingestion and personalization crates.
//!
//! Implementations live next to their backends: the JSON article pool in
//! `newsdesk-ingest`, in-memory stores in `newsdesk-digest`, and Postgres
//! stores in `newsdesk-db`.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::{ArticleRecord, CategoryLabel, DigestRecord, PreferenceScore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("stored data could not be encoded or decoded: {0}")]
    Codec(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// The persisted, categorized article batch from the latest collection run.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Load the current pool. An absent pool is an empty pool.
    async fn load_categorized_articles(&self) -> Result<Vec<ArticleRecord>, StoreError>;

    /// Replace the pool with `articles`.
    async fn save_categorized_articles(&self, articles: &[ArticleRecord]) -> Result<(), StoreError>;
}

/// Per-user category scores.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Add `weight` to the (user, category) score, creating the row at
    /// `weight` if it does not exist. Must be an atomic read-modify-write.
    ///
    /// Returns the score after the increment.
    async fn increment(
        &self,
        user_id: &str,
        category: CategoryLabel,
        weight: u64,
    ) -> Result<u64, StoreError>;

    /// All rows for a user, oldest first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<PreferenceScore>, StoreError>;
}

/// Result of an insert-if-absent on the digest store.
#[derive(Debug, Clone, PartialEq)]
pub enum DigestInsert {
    Inserted(DigestRecord),
    /// A record already existed for the same (user, date); it is returned
    /// unchanged and the candidate is discarded.
    Existing(DigestRecord),
}

impl DigestInsert {
    #[must_use]
    pub fn into_record(self) -> DigestRecord {
        match self {
            DigestInsert::Inserted(record) | DigestInsert::Existing(record) => record,
        }
    }
}

/// Daily digests, unique per (user, date).
#[async_trait]
pub trait DigestStore: Send + Sync {
    async fn get(&self, user_id: &str, date: NaiveDate) -> Result<Option<DigestRecord>, StoreError>;

    /// Atomically insert `record` unless one already exists for its
    /// (user, date).
    async fn insert_if_absent(&self, record: DigestRecord) -> Result<DigestInsert, StoreError>;

    /// Most recently built digest for the user, if any.
    async fn latest(&self, user_id: &str) -> Result<Option<DigestRecord>, StoreError>;
}
