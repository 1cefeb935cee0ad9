use newsdesk_core::ArticleRecord;
use serde::Serialize;

use crate::error::IngestError;

/// Tuning for one collection run.
#[derive(Debug, Clone, Copy)]
pub struct CollectOptions {
    /// Per-adapter ceiling. A source still running after this is empty for the run.
    pub timeout_secs: u64,
    /// How many sources are fetched at the same time.
    pub max_concurrent: usize,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 12,
            max_concurrent: 4,
        }
    }
}

/// What one adapter produced. `error` is set when the source was unavailable,
/// in which case `records` is empty.
#[derive(Debug)]
pub struct SourceFetch {
    pub source: String,
    pub records: Vec<ArticleRecord>,
    pub error: Option<IngestError>,
}

impl SourceFetch {
    #[must_use]
    pub fn ok(source: impl Into<String>, records: Vec<ArticleRecord>) -> Self {
        Self {
            source: source.into(),
            records,
            error: None,
        }
    }

    #[must_use]
    pub fn unavailable(source: impl Into<String>, error: IngestError) -> Self {
        Self {
            source: source.into(),
            records: Vec::new(),
            error: Some(error),
        }
    }
}

/// Per-source line of a [`CollectionReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceYield {
    pub source: String,
    /// Records the adapter returned, before deduplication.
    pub fetched: usize,
    pub error: Option<String>,
}

/// Outcome of a collection run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectionReport {
    /// Deduplicated records in first-seen order.
    pub articles: Vec<ArticleRecord>,
    /// One entry per configured source, in configured order.
    pub yields: Vec<SourceYield>,
    pub duplicates_dropped: usize,
    /// Records with neither url nor title.
    pub malformed_dropped: usize,
}

impl CollectionReport {
    #[must_use]
    pub fn failed_sources(&self) -> usize {
        self.yields.iter().filter(|y| y.error.is_some()).count()
    }
}
