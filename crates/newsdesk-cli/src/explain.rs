use std::sync::Arc;

use newsdesk_core::{AppConfig, ArticleRecord};
use newsdesk_explain::{ExplainMode, Explainer, GeminiClient, JsonFileCache};

const GENERATION_TIMEOUT_SECS: u64 = 30;

/// The configured explainer, or `None` when `GEMINI_API_KEY` is not set.
pub(crate) fn build_explainer(config: &AppConfig) -> anyhow::Result<Option<Explainer>> {
    let Some(api_key) = config.gemini_api_key.as_deref() else {
        return Ok(None);
    };
    let client = GeminiClient::new(api_key, &config.gemini_model, GENERATION_TIMEOUT_SECS)?;
    let cache = JsonFileCache::new(&config.explain_cache_path);
    Ok(Some(Explainer::new(Arc::new(cache), Arc::new(client))))
}

/// # Errors
///
/// Returns an error if no model key is configured.
pub(crate) async fn run_explain(
    config: &AppConfig,
    mode: ExplainMode,
    text: &str,
) -> anyhow::Result<()> {
    let explainer = build_explainer(config)?
        .ok_or_else(|| anyhow::anyhow!("GEMINI_API_KEY is not set; cannot explain text"))?;
    let explanation = explainer.explain(text, mode).await;
    println!("{}", explanation.text);
    Ok(())
}

/// Newspaper-style rewrite of one article, or its stored synopsis when no
/// model is configured or generation fails.
pub(crate) async fn newspaper_text(explainer: Option<&Explainer>, article: &ArticleRecord) -> String {
    if let Some(explainer) = explainer {
        let content = article
            .content
            .as_deref()
            .or(article.description.as_deref())
            .unwrap_or_default();
        match explainer
            .newspaper_summary(&article.title, content, &article.source)
            .await
        {
            Ok(summary) => return summary.text,
            Err(e) => tracing::warn!(url = %article.url, error = %e, "newspaper summary failed"),
        }
    }
    article
        .synopsis
        .clone()
        .unwrap_or_else(|| newsdesk_ingest::select_summary(article))
}
