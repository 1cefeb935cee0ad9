use axum::{
    extract::{Query, State},
    Extension, Json,
};
use newsdesk_core::ArticleRecord;
use newsdesk_explain::{ExplainMode, Explainer, Explanation};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ExplainQuery {
    pub mode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ExplainRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct NewspaperRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Serialize)]
pub(super) struct NewspaperResponse {
    text: String,
    /// `false` when the synopsis rule was used instead of the model.
    generated: bool,
}

fn require_explainer<'a>(state: &'a AppState, req_id: &str) -> Result<&'a Explainer, ApiError> {
    state.explainer.as_ref().ok_or_else(|| {
        ApiError::new(
            req_id,
            "unavailable",
            "AI explanations are not configured (GEMINI_API_KEY is unset)",
        )
    })
}

/// POST /api/v1/explain?mode=kid|hinglish|bullets|plain
///
/// Generator failures are reported in-band as the fixed failure message,
/// never as an HTTP error.
pub(super) async fn explain_text(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ExplainQuery>,
    Json(body): Json<ExplainRequest>,
) -> Result<Json<ApiResponse<Explanation>>, ApiError> {
    let rid = &req_id.0;
    let mode = match query.mode.as_deref() {
        Some(raw) => raw
            .parse::<ExplainMode>()
            .map_err(|e| ApiError::new(rid, "validation_error", e.to_string()))?,
        None => ExplainMode::default(),
    };
    let explainer = require_explainer(&state, rid)?;

    let explanation = explainer.explain(&body.text, mode).await;
    Ok(ApiResponse::new(explanation, req_id.0))
}

/// POST /api/v1/explain/newspaper: a short neutral summary of one article,
/// falling back to the synopsis rule when the model is absent or fails.
pub(super) async fn newspaper_summary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<NewspaperRequest>,
) -> Result<Json<ApiResponse<NewspaperResponse>>, ApiError> {
    if body.title.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "title must not be empty",
        ));
    }

    if let Some(explainer) = &state.explainer {
        match explainer
            .newspaper_summary(&body.title, &body.content, &body.source)
            .await
        {
            Ok(summary) => {
                return Ok(ApiResponse::new(
                    NewspaperResponse {
                        text: summary.text,
                        generated: true,
                    },
                    req_id.0,
                ));
            }
            Err(e) => tracing::warn!(error = %e, "newspaper summary failed; using synopsis"),
        }
    }

    let mut article = ArticleRecord::new(body.source, body.title, String::new());
    if !body.content.trim().is_empty() {
        article.content = Some(body.content);
    }
    Ok(ApiResponse::new(
        NewspaperResponse {
            text: newsdesk_ingest::select_summary(&article),
            generated: false,
        },
        req_id.0,
    ))
}
