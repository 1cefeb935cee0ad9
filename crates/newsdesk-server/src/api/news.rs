use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use newsdesk_core::{ArticleRecord, CategoryLabel};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_store_error, normalize_limit, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct NewsQuery {
    pub limit: Option<usize>,
}

/// GET /api/v1/news: the pool in stored order.
pub(super) async fn list_news(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<NewsQuery>,
) -> Result<Json<ApiResponse<Vec<ArticleRecord>>>, ApiError> {
    let articles = newsdesk_ingest::list_articles(state.articles.as_ref(), normalize_limit(query.limit))
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(articles, req_id.0))
}

/// GET /api/v1/news/category/{category}
pub(super) async fn list_news_by_category(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(category): Path<String>,
) -> Result<Json<ApiResponse<Vec<ArticleRecord>>>, ApiError> {
    let label = category.parse::<CategoryLabel>().map_err(|_| {
        ApiError::new(
            req_id.0.clone(),
            "validation_error",
            format!("unknown category '{category}'; expected one of sports, tech, india, world, general"),
        )
    })?;

    let articles = newsdesk_ingest::articles_by_category(state.articles.as_ref(), label)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(articles, req_id.0))
}
