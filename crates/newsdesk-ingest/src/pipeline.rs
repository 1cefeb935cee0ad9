//! Collection pipeline orchestration.

use newsdesk_core::{ArticleRecord, ArticleStore, SourceConfig};

use crate::categorizer::categorize;
use crate::collector::collect_all;
use crate::error::IngestError;
use crate::summary::select_summary;
use crate::types::{CollectOptions, CollectionReport};

/// Label one record with its category and synopsis.
#[must_use]
pub fn enrich(mut article: ArticleRecord) -> ArticleRecord {
    article.category = Some(categorize(&article));
    article.synopsis = Some(select_summary(&article));
    article
}

/// Collect from all sources and enrich the merged batch, without persisting.
pub async fn collect_and_enrich(
    client: &reqwest::Client,
    sources: &[SourceConfig],
    options: CollectOptions,
) -> CollectionReport {
    let mut report = collect_all(client, sources, options).await;
    report.articles = report.articles.into_iter().map(enrich).collect();
    report
}

/// Run one full collection and replace the article pool with the result.
///
/// 1. Fetch all sources concurrently (failures degrade to empty yields).
/// 2. Deduplicate by identity key.
/// 3. Assign category and synopsis to every record.
/// 4. Save the batch as the new pool.
///
/// # Errors
///
/// Returns [`IngestError::Store`] if the batch cannot be persisted. Nothing
/// else fails the run.
pub async fn run_collection(
    client: &reqwest::Client,
    sources: &[SourceConfig],
    options: CollectOptions,
    store: &dyn ArticleStore,
) -> Result<CollectionReport, IngestError> {
    let report = collect_and_enrich(client, sources, options).await;

    if report.articles.is_empty() {
        tracing::warn!(
            sources = sources.len(),
            "collection produced no articles; saving empty pool"
        );
    }

    store.save_categorized_articles(&report.articles).await?;
    tracing::info!(count = report.articles.len(), "article pool saved");

    Ok(report)
}
