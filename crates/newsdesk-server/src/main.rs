mod api;
mod collection;
mod middleware;
mod scheduler;

use std::sync::Arc;

use newsdesk_core::{AppConfig, ArticleStore, DigestStore, Environment, PreferenceStore};
use newsdesk_digest::{DigestBuilder, MemoryDigestStore, MemoryPreferenceStore, PreferenceLedger};
use newsdesk_explain::{Explainer, GeminiClient, JsonFileCache};
use newsdesk_ingest::{CollectOptions, JsonFileArticleStore};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, default_rate_limit_state, AppState};

const GENERATION_TIMEOUT_SECS: u64 = 30;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = newsdesk_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let state = build_state(&config).await?;
    let _scheduler = scheduler::build_scheduler(state.clone(), &config.collect_cron).await?;

    let app = build_app(state, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "newsdesk-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Wire stores and clients from configuration.
///
/// Postgres backs preferences and digests when `DATABASE_URL` is set;
/// otherwise in-memory stores are used, which is only allowed in development.
async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let (db, preferences, digests): (
        Option<sqlx::PgPool>,
        Arc<dyn PreferenceStore>,
        Arc<dyn DigestStore>,
    ) = if config.database_url.is_some() {
        let pool = newsdesk_db::connect_pool_from_config(config).await?;
        let applied = newsdesk_db::run_migrations(&pool).await?;
        tracing::info!(applied, "database migrations up to date");
        (
            Some(pool.clone()),
            Arc::new(newsdesk_db::PgPreferenceStore::new(pool.clone())),
            Arc::new(newsdesk_db::PgDigestStore::new(pool)),
        )
    } else if config.env == Environment::Development {
        tracing::warn!(
            "DATABASE_URL not set; preferences and digests are in memory and lost on restart"
        );
        (
            None,
            Arc::new(MemoryPreferenceStore::default()),
            Arc::new(MemoryDigestStore::default()),
        )
    } else {
        anyhow::bail!("DATABASE_URL is required outside development");
    };

    let mut sources = newsdesk_core::load_sources_or_default(&config.sources_path)?;
    sources.resolve_api_keys(|var| std::env::var(var).ok());
    tracing::info!(count = sources.sources.len(), "sources loaded");

    let articles: Arc<dyn ArticleStore> = Arc::new(JsonFileArticleStore::new(&config.pool_path));
    let ledger = PreferenceLedger::new(preferences);
    let digest_builder = DigestBuilder::new(ledger.clone(), digests, Arc::clone(&articles))
        .with_cap(config.digest_cap);

    let explainer = match config.gemini_api_key.as_deref() {
        Some(key) => {
            let client = GeminiClient::new(key, &config.gemini_model, GENERATION_TIMEOUT_SECS)?;
            let cache = JsonFileCache::new(&config.explain_cache_path);
            Some(Explainer::new(Arc::new(cache), Arc::new(client)))
        }
        None => {
            tracing::info!("GEMINI_API_KEY not set; explain endpoints will report unavailable");
            None
        }
    };

    Ok(AppState {
        db,
        http: newsdesk_ingest::build_http_client(config.fetch_timeout_secs, &config.user_agent)?,
        sources: Arc::new(sources),
        collect_options: CollectOptions {
            timeout_secs: config.fetch_timeout_secs,
            max_concurrent: config.max_concurrent_sources,
        },
        articles,
        ledger,
        digests: digest_builder,
        explainer,
        collect_lock: Arc::new(Mutex::new(())),
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
