//! Preference and digest command handlers.
//!
//! These all run against Postgres; the article pool is read from the
//! configured JSON file.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use newsdesk_core::{AppConfig, CategoryLabel, DigestRecord};
use newsdesk_db::{PgDigestStore, PgPreferenceStore};
use newsdesk_digest::{DigestBuilder, DigestOutcome, PreferenceLedger};
use newsdesk_ingest::JsonFileArticleStore;

use crate::explain::{build_explainer, newspaper_text};
use crate::news::truncate;

/// Sub-commands available under `digest`.
#[derive(Debug, Subcommand)]
pub enum DigestCommands {
    /// Build today's digest for a user (no-op if one already exists)
    Build {
        #[arg(long)]
        user: String,
        /// Calendar day in UTC, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show the user's most recent digest
    Show {
        #[arg(long)]
        user: String,
        /// Rewrite each entry as a short newspaper paragraph
        #[arg(long)]
        newspaper: bool,
    },
}

fn ledger(pool: &sqlx::PgPool) -> PreferenceLedger {
    PreferenceLedger::new(Arc::new(PgPreferenceStore::new(pool.clone())))
}

fn builder(pool: &sqlx::PgPool, config: &AppConfig) -> DigestBuilder {
    DigestBuilder::new(
        ledger(pool),
        Arc::new(PgDigestStore::new(pool.clone())),
        Arc::new(JsonFileArticleStore::new(&config.pool_path)),
    )
    .with_cap(config.digest_cap)
}

pub(crate) async fn run_track(
    pool: &sqlx::PgPool,
    user: &str,
    category: CategoryLabel,
    weight: u64,
) -> anyhow::Result<()> {
    let score = ledger(pool).record_signal(user, category, weight).await?;
    println!("{user}: {category} is now {score}");
    Ok(())
}

pub(crate) async fn run_prefs(pool: &sqlx::PgPool, user: &str) -> anyhow::Result<()> {
    let ranked = ledger(pool).ranked_preferences(user).await?;
    if ranked.is_empty() {
        println!("no preferences recorded for {user}; use `newsdesk track` first");
        return Ok(());
    }

    println!("{:<10}SCORE", "CATEGORY");
    for pref in &ranked {
        println!("{:<10}{}", pref.category, pref.score);
    }
    Ok(())
}

pub(crate) async fn run_digest(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    command: DigestCommands,
) -> anyhow::Result<()> {
    match command {
        DigestCommands::Build { user, date } => {
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            let outcome = builder(pool, config).build_digest(&user, date).await?;
            match outcome {
                DigestOutcome::Built(record) => {
                    println!("built digest for {user} on {date}");
                    print_digest(&record);
                }
                DigestOutcome::AlreadyBuilt(record) => {
                    println!("digest for {user} on {date} already exists");
                    print_digest(&record);
                }
                DigestOutcome::NoPreferences => {
                    println!("no preferences recorded for {user}; digest not built");
                }
            }
        }
        DigestCommands::Show { user, newspaper } => {
            let Some(record) = builder(pool, config).latest_digest(&user).await? else {
                println!("no digest built for {user} yet; run `newsdesk digest build`");
                return Ok(());
            };
            if newspaper {
                let explainer = build_explainer(config)?;
                println!("{user}'s newspaper for {}", record.date);
                for article in &record.articles {
                    println!();
                    println!("{}", article.title);
                    println!("{}", newspaper_text(explainer.as_ref(), article).await);
                }
            } else {
                print_digest(&record);
            }
        }
    }
    Ok(())
}

fn print_digest(record: &DigestRecord) {
    if record.articles.is_empty() {
        println!("(no matching articles)");
        return;
    }
    for (i, article) in record.articles.iter().enumerate() {
        let category = article
            .category
            .map_or_else(|| "\u{2014}".to_string(), |c| c.to_string());
        println!("{:>2}. [{category}] {}", i + 1, truncate(&article.title, 70));
    }
}
