//! One collection run, shared by `POST /api/v1/collect` and the cron job.
//!
//! Runs are serialized by `AppState::collect_lock`; when a database is
//! configured the run and each source's yield are recorded.

use newsdesk_ingest::CollectionReport;
use sqlx::PgPool;

use crate::api::AppState;

#[derive(Debug)]
pub enum CollectOutcome {
    Completed(CollectionReport),
    /// Another run held the lock; nothing was fetched.
    AlreadyRunning,
}

/// Run one collection unless another is in progress.
///
/// # Errors
///
/// Returns an error if the pool cannot be written or run bookkeeping fails.
/// Source failures are part of the report, not errors.
pub async fn run_collection_job(
    state: &AppState,
    trigger: &'static str,
) -> anyhow::Result<CollectOutcome> {
    let Ok(_guard) = state.collect_lock.try_lock() else {
        tracing::info!(trigger, "collection already running; request skipped");
        return Ok(CollectOutcome::AlreadyRunning);
    };

    tracing::info!(trigger, sources = state.sources.sources.len(), "collection started");
    let report = match &state.db {
        Some(pool) => run_tracked(pool, state, trigger).await?,
        None => collect(state).await?,
    };
    tracing::info!(
        trigger,
        saved = report.articles.len(),
        failed_sources = report.failed_sources(),
        "collection finished"
    );

    Ok(CollectOutcome::Completed(report))
}

async fn collect(state: &AppState) -> Result<CollectionReport, newsdesk_ingest::IngestError> {
    newsdesk_ingest::run_collection(
        &state.http,
        &state.sources.sources,
        state.collect_options,
        state.articles.as_ref(),
    )
    .await
}

async fn run_tracked(
    pool: &PgPool,
    state: &AppState,
    trigger: &'static str,
) -> anyhow::Result<CollectionReport> {
    let run = newsdesk_db::begin_collection_run(pool, trigger).await?;

    let report = match collect(state).await {
        Ok(report) => report,
        Err(e) => {
            fail_run_best_effort(pool, run.id, format!("{e:#}")).await;
            return Err(e.into());
        }
    };

    if let Err(err) = newsdesk_db::record_collection_outcome(pool, run.id, &report).await {
        fail_run_best_effort(pool, run.id, format!("{err:#}")).await;
        return Err(err.into());
    }

    Ok(report)
}

async fn fail_run_best_effort(pool: &PgPool, run_id: i64, message: String) {
    if let Err(mark_err) = newsdesk_db::fail_collection_run(pool, run_id, &message).await {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to mark collection run as failed"
        );
    }
}
