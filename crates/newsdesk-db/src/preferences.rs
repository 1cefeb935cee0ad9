//! Database operations for `user_preferences`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use newsdesk_core::{CategoryLabel, PreferenceScore, PreferenceStore, StoreError};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `user_preferences` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PreferenceRow {
    pub id: i64,
    pub user_id: String,
    pub category: String,
    /// `BIGINT NOT NULL CHECK (score >= 0)`.
    pub score: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PreferenceRow {
    /// # Errors
    ///
    /// Returns [`DbError::Decode`] if the stored category or score is out of range.
    pub fn into_score(self) -> Result<PreferenceScore, DbError> {
        let category = self
            .category
            .parse::<CategoryLabel>()
            .map_err(|e| DbError::Decode(e.to_string()))?;
        let score = u64::try_from(self.score)
            .map_err(|_| DbError::Decode(format!("negative score {}", self.score)))?;
        Ok(PreferenceScore {
            user_id: self.user_id,
            category,
            score,
            created_at: self.created_at,
        })
    }
}

/// Adds `weight` to the (user, category) score in one statement, creating
/// the row at `weight` on first use. Returns the new score.
///
/// The `ON CONFLICT ... DO UPDATE` upsert is atomic per row, so concurrent
/// increments serialize on the unique index.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn increment_preference(
    pool: &PgPool,
    user_id: &str,
    category: CategoryLabel,
    weight: i64,
) -> Result<i64, DbError> {
    let score = sqlx::query_scalar::<_, i64>(
        "INSERT INTO user_preferences (user_id, category, score) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (user_id, category) DO UPDATE SET \
             score      = user_preferences.score + EXCLUDED.score, \
             updated_at = NOW() \
         RETURNING score",
    )
    .bind(user_id)
    .bind(category.as_str())
    .bind(weight)
    .fetch_one(pool)
    .await?;

    Ok(score)
}

/// All preference rows for a user, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_preferences(pool: &PgPool, user_id: &str) -> Result<Vec<PreferenceRow>, DbError> {
    let rows = sqlx::query_as::<_, PreferenceRow>(
        "SELECT id, user_id, category, score, created_at, updated_at \
         FROM user_preferences \
         WHERE user_id = $1 \
         ORDER BY created_at, id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// [`PreferenceStore`] over Postgres.
#[derive(Debug, Clone)]
pub struct PgPreferenceStore {
    pool: PgPool,
}

impl PgPreferenceStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceStore for PgPreferenceStore {
    async fn increment(
        &self,
        user_id: &str,
        category: CategoryLabel,
        weight: u64,
    ) -> Result<u64, StoreError> {
        let weight = i64::try_from(weight)
            .map_err(|_| StoreError::Codec(format!("weight {weight} exceeds BIGINT")))?;
        let score = increment_preference(&self.pool, user_id, category, weight).await?;
        u64::try_from(score).map_err(|_| StoreError::Codec(format!("negative score {score}")))
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<PreferenceScore>, StoreError> {
        let rows = list_preferences(&self.pool, user_id).await?;
        rows.into_iter()
            .map(|row| row.into_score().map_err(StoreError::from))
            .collect()
    }
}
