mod collect;
mod digest;
mod explain;
mod news;

use clap::{Parser, Subcommand};
use newsdesk_core::{AppConfig, CategoryLabel};
use newsdesk_explain::ExplainMode;
use tracing_subscriber::EnvFilter;

use crate::digest::DigestCommands;

#[derive(Debug, Parser)]
#[command(name = "newsdesk")]
#[command(about = "newsdesk command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch every configured source and replace the article pool
    Collect {
        /// List the sources that would be fetched without fetching them
        #[arg(long)]
        dry_run: bool,
    },
    /// List articles from the current pool
    News {
        /// Only show one category (sports, tech, india, world, general)
        #[arg(long)]
        category: Option<CategoryLabel>,
        /// Maximum number of articles to show
        #[arg(long, default_value_t = newsdesk_ingest::DEFAULT_LIST_LIMIT)]
        limit: usize,
    },
    /// Record an interest signal for a user
    Track {
        #[arg(long)]
        user: String,
        #[arg(long)]
        category: CategoryLabel,
        /// Amount added to the user's score for the category
        #[arg(long, default_value_t = 1)]
        weight: u64,
    },
    /// Show a user's category preferences, strongest first
    Prefs {
        #[arg(long)]
        user: String,
    },
    /// Build and read daily digests
    Digest {
        #[command(subcommand)]
        command: DigestCommands,
    },
    /// Explain a piece of text with the configured AI model
    Explain {
        /// kid, hinglish, bullets or plain
        #[arg(long, default_value = "plain")]
        mode: ExplainMode,
        text: String,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check that the database is reachable
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = newsdesk_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("newsdesk: run `newsdesk --help` for available commands");
        return Ok(());
    };

    match command {
        Commands::Collect { dry_run } => collect::run_collect(&config, dry_run).await,
        Commands::News { category, limit } => news::run_news(&config, category, limit).await,
        Commands::Track {
            user,
            category,
            weight,
        } => {
            let pool = open_pool(&config).await?;
            digest::run_track(&pool, &user, category, weight).await
        }
        Commands::Prefs { user } => {
            let pool = open_pool(&config).await?;
            digest::run_prefs(&pool, &user).await
        }
        Commands::Digest { command } => {
            let pool = open_pool(&config).await?;
            digest::run_digest(&pool, &config, command).await
        }
        Commands::Explain { mode, text } => explain::run_explain(&config, mode, &text).await,
        Commands::Db { command } => run_db(&config, command).await,
    }
}

/// Connect to Postgres, failing with a readable message when
/// `DATABASE_URL` is not configured.
async fn open_pool(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    newsdesk_db::connect_pool_from_config(config)
        .await
        .map_err(|e| anyhow::anyhow!("database unavailable: {e}"))
}

async fn run_db(config: &AppConfig, command: DbCommands) -> anyhow::Result<()> {
    let pool = open_pool(config).await?;
    match command {
        DbCommands::Migrate => {
            let applied = newsdesk_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        DbCommands::Ping => {
            newsdesk_db::health_check(&pool).await?;
            println!("database ok");
        }
    }
    Ok(())
}

/// Mark a collection run failed, logging (not propagating) any error from
/// the bookkeeping update itself.
async fn fail_run_best_effort(pool: &sqlx::PgPool, run_id: i64, message: String) {
    if let Err(mark_err) = newsdesk_db::fail_collection_run(pool, run_id, &message).await {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to mark collection run as failed"
        );
    }
}
