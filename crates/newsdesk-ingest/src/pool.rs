//! Article pool storage and read queries.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use newsdesk_core::{ArticleRecord, ArticleStore, CategoryLabel, StoreError};
use tokio::sync::{Mutex, RwLock};

use crate::categorizer::categorize;

/// Default page size for [`list_articles`].
pub const DEFAULT_LIST_LIMIT: usize = 200;

/// The pool as a pretty-printed JSON array on disk.
///
/// Saves go through a sibling temp file and a rename, so readers see either
/// the old pool or the new one.
#[derive(Debug)]
pub struct JsonFileArticleStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileArticleStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl ArticleStore for JsonFileArticleStore {
    async fn load_categorized_articles(&self) -> Result<Vec<ArticleRecord>, StoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Self::io_error(&self.path, e)),
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&raw).map_err(|e| {
            StoreError::Codec(format!("{}: {e}", self.path.display()))
        })
    }

    async fn save_categorized_articles(&self, articles: &[ArticleRecord]) -> Result<(), StoreError> {
        let body = serde_json::to_string_pretty(articles)
            .map_err(|e| StoreError::Codec(e.to_string()))?;

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Self::io_error(parent, e))?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| Self::io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| Self::io_error(&self.path, e))?;

        tracing::debug!(path = %self.path.display(), count = articles.len(), "pool written");
        Ok(())
    }
}

/// In-process pool, used by tests and by the server when no pool path is wanted.
#[derive(Debug, Default)]
pub struct MemoryArticleStore {
    articles: RwLock<Vec<ArticleRecord>>,
}

impl MemoryArticleStore {
    #[must_use]
    pub fn with_articles(articles: Vec<ArticleRecord>) -> Self {
        Self {
            articles: RwLock::new(articles),
        }
    }
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    async fn load_categorized_articles(&self) -> Result<Vec<ArticleRecord>, StoreError> {
        Ok(self.articles.read().await.clone())
    }

    async fn save_categorized_articles(&self, articles: &[ArticleRecord]) -> Result<(), StoreError> {
        *self.articles.write().await = articles.to_vec();
        Ok(())
    }
}

/// The first `limit` articles of the pool, in pool order.
///
/// # Errors
///
/// Returns [`StoreError`] if the pool cannot be read.
pub async fn list_articles(
    store: &dyn ArticleStore,
    limit: usize,
) -> Result<Vec<ArticleRecord>, StoreError> {
    let mut articles = store.load_categorized_articles().await?;
    articles.truncate(limit);
    Ok(articles)
}

/// Pool articles labelled `category`, in pool order.
///
/// Records saved without a label are categorized on the fly.
///
/// # Errors
///
/// Returns [`StoreError`] if the pool cannot be read.
pub async fn articles_by_category(
    store: &dyn ArticleStore,
    category: CategoryLabel,
) -> Result<Vec<ArticleRecord>, StoreError> {
    let articles = store.load_categorized_articles().await?;
    Ok(articles
        .into_iter()
        .filter(|a| a.category.unwrap_or_else(|| categorize(a)) == category)
        .collect())
}
