//! `collect`: fetch every source, enrich, and replace the article pool.
//!
//! When a database is configured the run and each source's yield are
//! recorded in `collection_runs` / `collection_run_sources`. Source failures
//! never fail the command; only storage failures do.

use newsdesk_core::{AppConfig, SourcesFile};
use newsdesk_ingest::{CollectOptions, CollectionReport, JsonFileArticleStore};

use crate::fail_run_best_effort;

/// Load the configured sources (or the built-in set) with API keys filled in
/// from the environment.
pub(crate) fn load_sources(config: &AppConfig) -> anyhow::Result<SourcesFile> {
    if !config.sources_path.exists() {
        tracing::info!(
            path = %config.sources_path.display(),
            "sources file not found; using built-in sources"
        );
    }
    let mut sources = newsdesk_core::load_sources_or_default(&config.sources_path)?;
    sources.resolve_api_keys(|var| std::env::var(var).ok());
    Ok(sources)
}

/// Run one collection from the CLI.
///
/// # Errors
///
/// Returns an error if the sources file is invalid, the HTTP client cannot
/// be built, the pool cannot be written, or run bookkeeping fails.
pub(crate) async fn run_collect(config: &AppConfig, dry_run: bool) -> anyhow::Result<()> {
    let sources = load_sources(config)?;

    if dry_run {
        let names: Vec<&str> = sources.sources.iter().map(|s| s.name()).collect();
        println!(
            "dry-run: would collect from {} sources: [{}]",
            names.len(),
            names.join(", ")
        );
        return Ok(());
    }

    let client = newsdesk_ingest::build_http_client(config.fetch_timeout_secs, &config.user_agent)?;
    let options = CollectOptions {
        timeout_secs: config.fetch_timeout_secs,
        max_concurrent: config.max_concurrent_sources,
    };
    let store = JsonFileArticleStore::new(&config.pool_path);

    let report = if config.database_url.is_some() {
        let pool = newsdesk_db::connect_pool_from_config(config).await?;
        run_tracked(&pool, &client, &sources, options, &store).await?
    } else {
        tracing::debug!("DATABASE_URL not set; collection run is not recorded");
        newsdesk_ingest::run_collection(&client, &sources.sources, options, &store).await?
    };

    for line in report_lines(&report) {
        println!("{line}");
    }
    println!("pool written to {}", store.path().display());
    Ok(())
}

async fn run_tracked(
    pool: &sqlx::PgPool,
    client: &reqwest::Client,
    sources: &SourcesFile,
    options: CollectOptions,
    store: &JsonFileArticleStore,
) -> anyhow::Result<CollectionReport> {
    let run = newsdesk_db::begin_collection_run(pool, "cli").await?;

    let report =
        match newsdesk_ingest::run_collection(client, &sources.sources, options, store).await {
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

/// Human-readable summary of a run: one line per source, then totals.
fn report_lines(report: &CollectionReport) -> Vec<String> {
    let mut lines = Vec::with_capacity(report.yields.len() + 1);
    for source in &report.yields {
        match &source.error {
            Some(error) => lines.push(format!("{:<24}unavailable: {error}", source.source)),
            None => lines.push(format!("{:<24}{} fetched", source.source, source.fetched)),
        }
    }
    lines.push(format!(
        "saved {} articles ({} duplicates, {} malformed dropped; {}/{} sources failed)",
        report.articles.len(),
        report.duplicates_dropped,
        report.malformed_dropped,
        report.failed_sources(),
        report.yields.len()
    ));
    lines
}
