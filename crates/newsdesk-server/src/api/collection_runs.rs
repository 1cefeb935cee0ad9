use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct CollectionRunsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(super) struct CollectionRunItem {
    collection_run_id: Uuid,
    trigger_source: String,
    status: String,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    articles_saved: i32,
    duplicates_dropped: i32,
    malformed_dropped: i32,
    sources_failed: i32,
    error_message: Option<String>,
}

impl From<newsdesk_db::CollectionRunRow> for CollectionRunItem {
    fn from(row: newsdesk_db::CollectionRunRow) -> Self {
        Self {
            collection_run_id: row.public_id,
            trigger_source: row.trigger_source,
            status: row.status,
            started_at: row.started_at,
            completed_at: row.completed_at,
            articles_saved: row.articles_saved,
            duplicates_dropped: row.duplicates_dropped,
            malformed_dropped: row.malformed_dropped,
            sources_failed: row.sources_failed,
            error_message: row.error_message,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct RunSourceItem {
    source: String,
    fetched: i32,
    error: Option<String>,
}

impl From<newsdesk_db::CollectionRunSourceRow> for RunSourceItem {
    fn from(row: newsdesk_db::CollectionRunSourceRow) -> Self {
        Self {
            source: row.source_name,
            fetched: row.records_fetched,
            error: row.error_message,
        }
    }
}

fn require_db<'a>(state: &'a AppState, request_id: &str) -> Result<&'a PgPool, ApiError> {
    state.db.as_ref().ok_or_else(|| {
        ApiError::new(
            request_id.to_string(),
            "unavailable",
            "collection runs are only recorded when DATABASE_URL is set",
        )
    })
}

/// GET /api/v1/collection-runs: newest first. Needs a database.
pub(super) async fn list_collection_runs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CollectionRunsQuery>,
) -> Result<Json<ApiResponse<Vec<CollectionRunItem>>>, ApiError> {
    let pool = require_db(&state, &req_id.0)?;

    let limit = i64::try_from(normalize_limit(query.limit)).unwrap_or(i64::MAX);
    let rows = newsdesk_db::list_collection_runs(pool, limit)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(CollectionRunItem::from).collect();
    Ok(ApiResponse::new(data, req_id.0))
}

/// GET /api/v1/collection-runs/{run_id}/sources: each source's yield in one run.
pub(super) async fn list_run_sources(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(run_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<RunSourceItem>>>, ApiError> {
    let pool = require_db(&state, &req_id.0)?;

    let rows = newsdesk_db::list_collection_run_sources(pool, run_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(RunSourceItem::from).collect();
    Ok(ApiResponse::new(data, req_id.0))
}
