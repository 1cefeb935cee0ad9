//! Database operations for `daily_digests`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use newsdesk_core::{ArticleRecord, DigestInsert, DigestRecord, DigestStore, StoreError};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `daily_digests` table. `articles` is a JSONB array of
/// article snapshots.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DigestRow {
    pub id: i64,
    pub user_id: String,
    pub digest_date: NaiveDate,
    pub articles: Json<Vec<ArticleRecord>>,
    pub created_at: DateTime<Utc>,
}

impl From<DigestRow> for DigestRecord {
    fn from(row: DigestRow) -> Self {
        DigestRecord {
            user_id: row.user_id,
            date: row.digest_date,
            articles: row.articles.0,
            created_at: row.created_at,
        }
    }
}

/// Inserts the digest unless one already exists for its (user, date).
///
/// Returns the inserted row, or `None` when the unique constraint turned the
/// insert into a no-op.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_digest_if_absent(
    pool: &PgPool,
    record: &DigestRecord,
) -> Result<Option<DigestRow>, DbError> {
    let row = sqlx::query_as::<_, DigestRow>(
        "INSERT INTO daily_digests (user_id, digest_date, articles, created_at) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (user_id, digest_date) DO NOTHING \
         RETURNING id, user_id, digest_date, articles, created_at",
    )
    .bind(&record.user_id)
    .bind(record.date)
    .bind(Json(&record.articles))
    .bind(record.created_at)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Fetches the digest for one (user, date).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_digest(
    pool: &PgPool,
    user_id: &str,
    date: NaiveDate,
) -> Result<Option<DigestRow>, DbError> {
    let row = sqlx::query_as::<_, DigestRow>(
        "SELECT id, user_id, digest_date, articles, created_at \
         FROM daily_digests \
         WHERE user_id = $1 AND digest_date = $2",
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Fetches the user's most recent digest by date.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_digest(pool: &PgPool, user_id: &str) -> Result<Option<DigestRow>, DbError> {
    let row = sqlx::query_as::<_, DigestRow>(
        "SELECT id, user_id, digest_date, articles, created_at \
         FROM daily_digests \
         WHERE user_id = $1 \
         ORDER BY digest_date DESC, created_at DESC \
         LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// [`DigestStore`] over Postgres; the unique `(user_id, digest_date)`
/// constraint is the once-per-day guard.
#[derive(Debug, Clone)]
pub struct PgDigestStore {
    pool: PgPool,
}

impl PgDigestStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DigestStore for PgDigestStore {
    async fn get(&self, user_id: &str, date: NaiveDate) -> Result<Option<DigestRecord>, StoreError> {
        Ok(get_digest(&self.pool, user_id, date).await?.map(Into::into))
    }

    async fn insert_if_absent(&self, record: DigestRecord) -> Result<DigestInsert, StoreError> {
        if let Some(row) = insert_digest_if_absent(&self.pool, &record).await? {
            return Ok(DigestInsert::Inserted(row.into()));
        }

        // Lost the race: another build stored the day's digest first.
        let existing = get_digest(&self.pool, &record.user_id, record.date)
            .await?
            .ok_or(DbError::NotFound)?;
        tracing::debug!(user_id = %record.user_id, date = %record.date, "digest insert was a no-op");
        Ok(DigestInsert::Existing(existing.into()))
    }

    async fn latest(&self, user_id: &str) -> Result<Option<DigestRecord>, StoreError> {
        Ok(latest_digest(&self.pool, user_id).await?.map(Into::into))
    }
}
