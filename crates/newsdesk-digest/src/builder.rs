//! Daily digest construction.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use newsdesk_core::{
    ArticleRecord, ArticleStore, DigestInsert, DigestRecord, DigestStore, PreferenceScore,
};
use newsdesk_ingest::categorize;

use crate::error::DigestError;
use crate::ledger::PreferenceLedger;

pub const DEFAULT_DIGEST_CAP: usize = 12;

/// Result of a build request.
#[derive(Debug, Clone, PartialEq)]
pub enum DigestOutcome {
    /// A new digest was stored for the day.
    Built(DigestRecord),
    /// The day already had a digest; it is returned unchanged.
    AlreadyBuilt(DigestRecord),
    /// The user has no preference rows, so there is nothing to rank.
    NoPreferences,
}

impl DigestOutcome {
    #[must_use]
    pub fn record(&self) -> Option<&DigestRecord> {
        match self {
            DigestOutcome::Built(record) | DigestOutcome::AlreadyBuilt(record) => Some(record),
            DigestOutcome::NoPreferences => None,
        }
    }
}

/// Builds at most one digest per user per day from ranked preferences and
/// the current article pool.
#[derive(Clone)]
pub struct DigestBuilder {
    ledger: PreferenceLedger,
    digests: Arc<dyn DigestStore>,
    articles: Arc<dyn ArticleStore>,
    cap: usize,
}

impl DigestBuilder {
    #[must_use]
    pub fn new(
        ledger: PreferenceLedger,
        digests: Arc<dyn DigestStore>,
        articles: Arc<dyn ArticleStore>,
    ) -> Self {
        Self {
            ledger,
            digests,
            articles,
            cap: DEFAULT_DIGEST_CAP,
        }
    }

    #[must_use]
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    /// Build the user's digest for `date`.
    ///
    /// An existing digest for the day is returned first, before the
    /// preference check. The final write is an insert-if-absent, so two
    /// concurrent builds for the same day store one record and both callers
    /// see it.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::InvalidUser`] for a blank user id, or
    /// [`DigestError::Store`] if any store operation fails.
    pub async fn build_digest(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<DigestOutcome, DigestError> {
        if user_id.trim().is_empty() {
            return Err(DigestError::InvalidUser);
        }

        if let Some(existing) = self.digests.get(user_id, date).await? {
            tracing::debug!(user_id, %date, "digest already built");
            return Ok(DigestOutcome::AlreadyBuilt(existing));
        }

        let ranked = self.ledger.ranked_preferences(user_id).await?;
        if ranked.is_empty() {
            tracing::info!(user_id, "no preferences recorded; digest skipped");
            return Ok(DigestOutcome::NoPreferences);
        }

        let pool = self.articles.load_categorized_articles().await?;
        let selected = select_articles(&ranked, &pool, self.cap);
        if selected.is_empty() {
            tracing::warn!(user_id, %date, pool = pool.len(), "digest has no matching articles");
        }

        let candidate = DigestRecord {
            user_id: user_id.to_string(),
            date,
            articles: selected,
            created_at: Utc::now(),
        };

        match self.digests.insert_if_absent(candidate).await? {
            DigestInsert::Inserted(record) => {
                tracing::info!(user_id, %date, articles = record.articles.len(), "digest built");
                Ok(DigestOutcome::Built(record))
            }
            DigestInsert::Existing(record) => Ok(DigestOutcome::AlreadyBuilt(record)),
        }
    }

    /// The user's most recently built digest.
    ///
    /// # Errors
    ///
    /// Returns [`DigestError::Store`] if the lookup fails.
    pub async fn latest_digest(&self, user_id: &str) -> Result<Option<DigestRecord>, DigestError> {
        Ok(self.digests.latest(user_id).await?)
    }
}

/// Pick up to `cap` articles: categories in ranked order, pool order within
/// each category, skipping titles already picked. Stops as soon as the cap
/// is reached, even part-way through a category.
///
/// Articles saved without a category are labelled on the fly.
#[must_use]
pub fn select_articles(
    ranked: &[PreferenceScore],
    pool: &[ArticleRecord],
    cap: usize,
) -> Vec<ArticleRecord> {
    let mut selected = Vec::new();
    let mut titles: HashSet<&str> = HashSet::new();

    'categories: for preference in ranked {
        for article in pool {
            if selected.len() >= cap {
                break 'categories;
            }
            let label = article.category.unwrap_or_else(|| categorize(article));
            if label != preference.category {
                continue;
            }
            if titles.insert(article.title.as_str()) {
                selected.push(article.clone());
            }
        }
    }

    selected
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod tests;
