use axum::{extract::State, Extension, Json};
use newsdesk_ingest::{CollectionReport, SourceYield};
use serde::Serialize;

use crate::collection::{run_collection_job, CollectOutcome};
use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

/// Report without the article bodies; `GET /news` serves those.
#[derive(Debug, Serialize)]
pub(super) struct CollectionSummary {
    saved: usize,
    duplicates_dropped: usize,
    malformed_dropped: usize,
    failed_sources: usize,
    sources: Vec<SourceYield>,
}

impl From<CollectionReport> for CollectionSummary {
    fn from(report: CollectionReport) -> Self {
        Self {
            saved: report.articles.len(),
            duplicates_dropped: report.duplicates_dropped,
            malformed_dropped: report.malformed_dropped,
            failed_sources: report.failed_sources(),
            sources: report.yields,
        }
    }
}

/// POST /api/v1/collect: run one collection now.
pub(super) async fn trigger_collection(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<CollectionSummary>>, ApiError> {
    match run_collection_job(&state, "api").await {
        Ok(CollectOutcome::Completed(report)) => {
            Ok(ApiResponse::new(CollectionSummary::from(report), req_id.0))
        }
        Ok(CollectOutcome::AlreadyRunning) => Err(ApiError::new(
            req_id.0,
            "conflict",
            "a collection run is already in progress",
        )),
        Err(e) => {
            tracing::error!(error = %e, "collection run failed");
            Err(ApiError::new(
                req_id.0,
                "internal_error",
                "collection run failed",
            ))
        }
    }
}
