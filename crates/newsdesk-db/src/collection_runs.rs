//! Bookkeeping for collection runs: one `collection_runs` row per run plus a
//! `collection_run_sources` row for each configured source.
//!
//! A run is inserted as `running` before any source is fetched. The
//! [`CollectionReport`] that comes back is stored in one transaction, so a
//! succeeded run always has its per-source yields alongside it.

use chrono::{DateTime, Utc};
use newsdesk_ingest::CollectionReport;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const RUN_COLUMNS: &str = "id, public_id, trigger_source, status, started_at, completed_at, \
                           articles_saved, duplicates_dropped, malformed_dropped, \
                           sources_failed, error_message";

/// A row from the `collection_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CollectionRunRow {
    pub id: i64,
    pub public_id: Uuid,
    /// `cli`, `api`, or `scheduler`.
    pub trigger_source: String,
    /// `running`, `succeeded`, or `failed`.
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub articles_saved: i32,
    pub duplicates_dropped: i32,
    /// Records with neither url nor title.
    pub malformed_dropped: i32,
    pub sources_failed: i32,
    pub error_message: Option<String>,
}

/// One source's yield in one run.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CollectionRunSourceRow {
    pub source_name: String,
    pub records_fetched: i32,
    /// Set when the source was unavailable; its fetch count is then zero.
    pub error_message: Option<String>,
}

impl CollectionRunSourceRow {
    #[must_use]
    pub fn failed(&self) -> bool {
        self.error_message.is_some()
    }
}

fn count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Insert a run in `running` state, stamped with the current time.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including an unknown
/// `trigger_source`.
pub async fn begin_collection_run(
    pool: &PgPool,
    trigger_source: &str,
) -> Result<CollectionRunRow, DbError> {
    let row = sqlx::query_as::<_, CollectionRunRow>(&format!(
        "INSERT INTO collection_runs (public_id, trigger_source) \
         VALUES ($1, $2) \
         RETURNING {RUN_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(trigger_source)
    .fetch_one(pool)
    .await?;

    tracing::debug!(run_id = row.id, trigger_source, "collection run started");
    Ok(row)
}

/// Store a finished run's report: every source's yield and the run totals,
/// then mark the run `succeeded`.
///
/// # Errors
///
/// Returns [`DbError::CollectionRunNotRunning`] if the run already finished,
/// or [`DbError::Sqlx`] if any statement fails. Nothing is written in either
/// case.
pub async fn record_collection_outcome(
    pool: &PgPool,
    run_id: i64,
    report: &CollectionReport,
) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        "UPDATE collection_runs \
         SET status = 'succeeded', completed_at = NOW(), \
             articles_saved = $2, duplicates_dropped = $3, \
             malformed_dropped = $4, sources_failed = $5 \
         WHERE id = $1 AND status = 'running'",
    )
    .bind(run_id)
    .bind(count(report.articles.len()))
    .bind(count(report.duplicates_dropped))
    .bind(count(report.malformed_dropped))
    .bind(count(report.failed_sources()))
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(DbError::CollectionRunNotRunning(run_id));
    }

    for source in &report.yields {
        sqlx::query(
            "INSERT INTO collection_run_sources \
                 (collection_run_id, source_name, records_fetched, error_message) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(run_id)
        .bind(&source.source)
        .bind(count(source.fetched))
        .bind(source.error.as_deref())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Mark a running run `failed` with the error that stopped it.
///
/// # Errors
///
/// Returns [`DbError::CollectionRunNotRunning`] if the run already finished,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn fail_collection_run(
    pool: &PgPool,
    run_id: i64,
    error_message: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE collection_runs \
         SET status = 'failed', completed_at = NOW(), error_message = $2 \
         WHERE id = $1 AND status = 'running'",
    )
    .bind(run_id)
    .bind(error_message)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::CollectionRunNotRunning(run_id));
    }
    Ok(())
}

/// The most recent `limit` runs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_collection_runs(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<CollectionRunRow>, DbError> {
    let rows = sqlx::query_as::<_, CollectionRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM collection_runs \
         ORDER BY started_at DESC, id DESC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Per-source yields of the run with the given public id, in configured order.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no run has that id, or [`DbError::Sqlx`]
/// if a query fails.
pub async fn list_collection_run_sources(
    pool: &PgPool,
    public_id: Uuid,
) -> Result<Vec<CollectionRunSourceRow>, DbError> {
    let run_id: i64 = sqlx::query_scalar("SELECT id FROM collection_runs WHERE public_id = $1")
        .bind(public_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)?;

    let rows = sqlx::query_as::<_, CollectionRunSourceRow>(
        "SELECT source_name, records_fetched, error_message \
         FROM collection_run_sources \
         WHERE collection_run_id = $1 \
         ORDER BY id",
    )
    .bind(run_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_saturate_at_i32_max() {
        assert_eq!(count(42), 42);
        assert_eq!(count(usize::MAX), i32::MAX);
    }

    #[test]
    fn source_row_failed_follows_error_message() {
        let ok = CollectionRunSourceRow {
            source_name: "BBC-World".to_string(),
            records_fetched: 30,
            error_message: None,
        };
        let down = CollectionRunSourceRow {
            source_name: "NewsAPI".to_string(),
            records_fetched: 0,
            error_message: Some("NEWSAPI_KEY is not set".to_string()),
        };
        assert!(!ok.failed());
        assert!(down.failed());
    }
}
