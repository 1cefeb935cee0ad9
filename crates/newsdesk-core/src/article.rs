use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CategoryLabel;

/// One normalized article, as produced by a source adapter and enriched
/// after collection.
///
/// Blank `url` or `title` means the upstream did not supply one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Configured name of the source that produced the record.
    pub source: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Upstream-provided summary, when the source carries one.
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Assigned once per collection run by the categorizer.
    #[serde(default)]
    pub category: Option<CategoryLabel>,
    /// Display-ready synopsis chosen by the summary selector.
    #[serde(default)]
    pub synopsis: Option<String>,
}

impl ArticleRecord {
    /// A bare record with only source, title and url set.
    #[must_use]
    pub fn new(source: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            title: title.into(),
            url: url.into(),
            content: None,
            description: None,
            summary: None,
            image: None,
            published_at: None,
            category: None,
            synopsis: None,
        }
    }
}

/// Compute the deduplication key for an article.
///
/// Uses the canonical url when one is present, otherwise the canonical
/// title. Returns `None` when the record has neither.
///
/// Url canonicalization trims, lower-cases, drops any `#fragment` and any
/// trailing `/`. The query string is kept since some publishers identify
/// articles by it. Title canonicalization trims, lower-cases and collapses
/// internal whitespace.
#[must_use]
pub fn identity_key(article: &ArticleRecord) -> Option<String> {
    let url = canonical_url(&article.url);
    if !url.is_empty() {
        return Some(format!("url:{url}"));
    }

    let title = canonical_title(&article.title);
    if title.is_empty() {
        None
    } else {
        Some(format!("title:{title}"))
    }
}

fn canonical_url(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let without_fragment = lowered.split('#').next().unwrap_or_default();
    without_fragment.trim_end_matches('/').to_string()
}

fn canonical_title(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
