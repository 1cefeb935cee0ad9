//! Per-user handlers: interest signals, ranked preferences, daily digests.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use newsdesk_core::{CategoryLabel, DigestRecord};
use newsdesk_digest::DigestOutcome;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_digest_error, ApiError, ApiResponse, AppState};

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct SignalRequest {
    pub category: String,
    pub weight: Option<u64>,
}

#[derive(Debug, Serialize)]
pub(super) struct SignalResponse {
    user_id: String,
    category: CategoryLabel,
    score: u64,
}

#[derive(Debug, Serialize)]
pub(super) struct PreferenceItem {
    category: CategoryLabel,
    score: u64,
}

#[derive(Debug, Deserialize)]
pub(super) struct DigestQuery {
    /// `YYYY-MM-DD`; defaults to today in UTC.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub(super) enum DigestStatus {
    Built,
    Existing,
    NoPreferences,
}

#[derive(Debug, Serialize)]
pub(super) struct DigestBuildResponse {
    status: DigestStatus,
    digest: Option<DigestRecord>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/users/{user_id}/signals: add `weight` (default 1) to the
/// user's score for `category`.
pub(super) async fn record_signal(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_id): Path<String>,
    Json(body): Json<SignalRequest>,
) -> Result<Json<ApiResponse<SignalResponse>>, ApiError> {
    let rid = &req_id.0;
    let category = body
        .category
        .parse::<CategoryLabel>()
        .map_err(|e| ApiError::new(rid, "validation_error", e.to_string()))?;

    let score = state
        .ledger
        .record_signal(&user_id, category, body.weight.unwrap_or(1))
        .await
        .map_err(|e| map_digest_error(rid.clone(), &e))?;

    Ok(ApiResponse::new(
        SignalResponse {
            user_id,
            category,
            score,
        },
        req_id.0,
    ))
}

/// GET /api/v1/users/{user_id}/preferences: highest score first.
pub(super) async fn list_preferences(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<PreferenceItem>>>, ApiError> {
    let ranked = state
        .ledger
        .ranked_preferences(&user_id)
        .await
        .map_err(|e| map_digest_error(req_id.0.clone(), &e))?;

    let data = ranked
        .into_iter()
        .map(|p| PreferenceItem {
            category: p.category,
            score: p.score,
        })
        .collect();

    Ok(ApiResponse::new(data, req_id.0))
}

/// POST /api/v1/users/{user_id}/digest: build the day's digest. Returns
/// 201 when a new digest was stored, 200 otherwise.
pub(super) async fn build_digest(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_id): Path<String>,
    Query(query): Query<DigestQuery>,
) -> Result<(StatusCode, Json<ApiResponse<DigestBuildResponse>>), ApiError> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let outcome = state
        .digests
        .build_digest(&user_id, date)
        .await
        .map_err(|e| map_digest_error(req_id.0.clone(), &e))?;

    let (status, body) = match outcome {
        DigestOutcome::Built(record) => (
            StatusCode::CREATED,
            DigestBuildResponse {
                status: DigestStatus::Built,
                digest: Some(record),
            },
        ),
        DigestOutcome::AlreadyBuilt(record) => (
            StatusCode::OK,
            DigestBuildResponse {
                status: DigestStatus::Existing,
                digest: Some(record),
            },
        ),
        DigestOutcome::NoPreferences => (
            StatusCode::OK,
            DigestBuildResponse {
                status: DigestStatus::NoPreferences,
                digest: None,
            },
        ),
    };

    Ok((status, ApiResponse::new(body, req_id.0)))
}

/// GET /api/v1/users/{user_id}/digest: the most recently built digest.
pub(super) async fn latest_digest(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<DigestRecord>>, ApiError> {
    let record = state
        .digests
        .latest_digest(&user_id)
        .await
        .map_err(|e| map_digest_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("no digest built for user '{user_id}'"),
            )
        })?;

    Ok(ApiResponse::new(record, req_id.0))
}
