//! Ingestion pipeline for newsdesk.
//!
//! Fans out to every configured upstream (keyed JSON APIs and RSS/Atom
//! feeds), merges and deduplicates the yield, then labels each article with
//! a category and a display-ready synopsis before persisting the batch as
//! the article pool.

pub mod categorizer;
pub mod collector;
pub mod error;
pub mod pipeline;
pub mod pool;
pub mod summary;
pub mod types;

mod sources;

pub use categorizer::{categorize, CATEGORY_RULES};
pub use collector::{collect_all, merge_yields};
pub use error::IngestError;
pub use pipeline::{collect_and_enrich, enrich, run_collection};
pub use pool::{
    articles_by_category, list_articles, JsonFileArticleStore, MemoryArticleStore, DEFAULT_LIST_LIMIT,
};
pub use sources::{build_http_client, fetch_source};
pub use summary::select_summary;
pub use types::{CollectOptions, CollectionReport, SourceFetch, SourceYield};
