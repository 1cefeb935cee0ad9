mod collect;
mod collection_runs;
mod explain;
mod news;
mod users;

use std::{sync::Arc, time::Duration};

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use newsdesk_core::{ArticleStore, SourcesFile};
use newsdesk_digest::{DigestBuilder, DigestError, PreferenceLedger};
use newsdesk_explain::Explainer;
use newsdesk_ingest::CollectOptions;
use serde::Serialize;
use sqlx::PgPool;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

/// Everything a handler or the cron job needs. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// `None` when running on in-memory stores.
    pub db: Option<PgPool>,
    pub http: reqwest::Client,
    pub sources: Arc<SourcesFile>,
    pub collect_options: CollectOptions,
    pub articles: Arc<dyn ArticleStore>,
    pub ledger: PreferenceLedger,
    pub digests: DigestBuilder,
    /// `None` when no model key is configured.
    pub explainer: Option<Explainer>,
    pub collect_lock: Arc<Mutex<()>>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(request_id),
        })
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<usize>) -> usize {
    limit
        .unwrap_or(newsdesk_ingest::DEFAULT_LIST_LIMIT)
        .clamp(1, newsdesk_ingest::DEFAULT_LIST_LIMIT)
}

pub(super) fn map_store_error(request_id: String, error: &newsdesk_core::StoreError) -> ApiError {
    tracing::error!(error = %error, "store operation failed");
    ApiError::new(request_id, "internal_error", "storage operation failed")
}

pub(super) fn map_db_error(request_id: String, error: &newsdesk_db::DbError) -> ApiError {
    if matches!(error, newsdesk_db::DbError::NotFound) {
        return ApiError::new(request_id, "not_found", error.to_string());
    }
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

pub(super) fn map_digest_error(request_id: String, error: &DigestError) -> ApiError {
    match error {
        DigestError::InvalidWeight | DigestError::InvalidUser => {
            ApiError::new(request_id, "validation_error", error.to_string())
        }
        DigestError::Store(e) => map_store_error(request_id, e),
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

fn limited_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/collect", post(collect::trigger_collection))
        .route(
            "/api/v1/collection-runs",
            get(collection_runs::list_collection_runs),
        )
        .route(
            "/api/v1/collection-runs/{run_id}/sources",
            get(collection_runs::list_run_sources),
        )
        .route("/api/v1/news", get(news::list_news))
        .route(
            "/api/v1/news/category/{category}",
            get(news::list_news_by_category),
        )
        .route(
            "/api/v1/users/{user_id}/signals",
            post(users::record_signal),
        )
        .route(
            "/api/v1/users/{user_id}/preferences",
            get(users::list_preferences),
        )
        .route(
            "/api/v1/users/{user_id}/digest",
            get(users::latest_digest).post(users::build_digest),
        )
        .route("/api/v1/explain", post(explain::explain_text))
        .route("/api/v1/explain/newspaper", post(explain::newspaper_summary))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(limited_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let Some(pool) = &state.db else {
        return (
            StatusCode::OK,
            ApiResponse::new(
                HealthData {
                    status: "ok",
                    database: "not_configured",
                },
                req_id.0,
            ),
        );
    };

    match newsdesk_db::health_check(pool).await {
        Ok(()) => (
            StatusCode::OK,
            ApiResponse::new(
                HealthData {
                    status: "ok",
                    database: "ok",
                },
                req_id.0,
            ),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiResponse::new(
                    HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    req_id.0,
                ),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
