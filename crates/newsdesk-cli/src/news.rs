use newsdesk_core::{AppConfig, ArticleRecord, CategoryLabel};
use newsdesk_ingest::JsonFileArticleStore;

const TITLE_WIDTH: usize = 60;

/// Print the pool (or one category of it) as a table.
///
/// # Errors
///
/// Returns an error if the pool file cannot be read.
pub(crate) async fn run_news(
    config: &AppConfig,
    category: Option<CategoryLabel>,
    limit: usize,
) -> anyhow::Result<()> {
    let store = JsonFileArticleStore::new(&config.pool_path);
    let articles = match category {
        Some(label) => {
            let mut matched = newsdesk_ingest::articles_by_category(&store, label).await?;
            matched.truncate(limit);
            matched
        }
        None => newsdesk_ingest::list_articles(&store, limit).await?,
    };

    if articles.is_empty() {
        println!("no articles in the pool; run `newsdesk collect` first");
        return Ok(());
    }

    println!("{:<10}{:<20}TITLE", "CATEGORY", "SOURCE");
    for article in &articles {
        println!("{}", article_row(article));
    }
    Ok(())
}

fn article_row(article: &ArticleRecord) -> String {
    let category = article
        .category
        .map_or_else(|| "\u{2014}".to_string(), |c| c.to_string());
    format!(
        "{:<10}{:<20}{}",
        category,
        truncate(&article.source, 18),
        truncate(&article.title, TITLE_WIDTH)
    )
}

pub(crate) fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        format!("{}...", text.chars().take(width).collect::<String>())
    } else {
        text.to_string()
    }
}
