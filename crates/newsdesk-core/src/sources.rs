use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const DEFAULT_API_MAX_ITEMS: usize = 50;
const DEFAULT_FEED_MAX_ITEMS: usize = 30;
const REDDIT_MAX_ITEMS: usize = 25;

/// One upstream source. The variant decides which adapter fetches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// JSON REST API authenticated with a query-string key.
    KeyedApi(KeyedApiSource),
    /// RSS 2.0 or Atom feed (also covers Reddit's `.rss` listings).
    Feed(FeedSource),
}

impl SourceConfig {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            SourceConfig::KeyedApi(api) => &api.name,
            SourceConfig::Feed(feed) => &feed.name,
        }
    }

    #[must_use]
    pub fn max_items(&self) -> usize {
        match self {
            SourceConfig::KeyedApi(api) => api.max_items,
            SourceConfig::Feed(feed) => feed.max_items,
        }
    }

    fn endpoint(&self) -> &str {
        match self {
            SourceConfig::KeyedApi(api) => &api.endpoint,
            SourceConfig::Feed(feed) => &feed.url,
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedApiSource {
    pub name: String,
    pub endpoint: String,
    /// Static query parameters sent with every request.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    /// Query parameter that carries the key (`apiKey`, `apikey`, ...).
    pub api_key_param: String,
    /// Environment variable holding the key.
    pub api_key_env: String,
    #[serde(default = "default_api_max_items")]
    pub max_items: usize,
    #[serde(default)]
    pub mapping: FieldMapping,
    /// Resolved from `api_key_env` by [`SourcesFile::resolve_api_keys`].
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for KeyedApiSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedApiSource")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("params", &self.params)
            .field("api_key_param", &self.api_key_param)
            .field("api_key_env", &self.api_key_env)
            .field("max_items", &self.max_items)
            .field("mapping", &self.mapping)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// Where each `ArticleRecord` field lives in one upstream item object.
///
/// Every field lists candidate keys; the first key holding a non-blank
/// string wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    /// Top-level key of the item array in the response body.
    pub items: String,
    pub title: Vec<String>,
    pub url: Vec<String>,
    pub content: Vec<String>,
    pub description: Vec<String>,
    pub image: Vec<String>,
    pub published_at: Vec<String>,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            items: "articles".to_string(),
            title: keys(&["title"]),
            url: keys(&["url"]),
            content: keys(&["content"]),
            description: keys(&["description"]),
            image: keys(&["image"]),
            published_at: keys(&["publishedAt"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
    #[serde(default = "default_feed_max_items")]
    pub max_items: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcesFile {
    pub sources: Vec<SourceConfig>,
}

impl SourcesFile {
    /// Fill in each keyed source's `api_key` from `lookup(api_key_env)`.
    ///
    /// Sources whose variable is unset or blank keep `api_key = None`; the
    /// adapter then reports them unavailable instead of failing the load.
    pub fn resolve_api_keys<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for source in &mut self.sources {
            if let SourceConfig::KeyedApi(api) = source {
                api.api_key = lookup(&api.api_key_env).filter(|k| !k.trim().is_empty());
            }
        }
    }
}

/// Load and validate the source list from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<SourcesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let sources_file: SourcesFile =
        serde_yaml::from_str(&content).map_err(ConfigError::SourcesFileParse)?;

    validate_sources(&sources_file)?;

    Ok(sources_file)
}

/// Load `path` if it exists, otherwise fall back to [`default_sources`].
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, parsed, or
/// fails validation.
pub fn load_sources_or_default(path: &Path) -> Result<SourcesFile, ConfigError> {
    if path.exists() {
        load_sources(path)
    } else {
        Ok(default_sources())
    }
}

/// The built-in source set used when no sources file is present.
///
/// Order matters: the collector keeps the first copy of a duplicate in
/// configured order.
#[must_use]
pub fn default_sources() -> SourcesFile {
    let mut sources = vec![
        SourceConfig::KeyedApi(KeyedApiSource {
            name: "NewsAPI".to_string(),
            endpoint: "https://newsapi.org/v2/top-headlines".to_string(),
            params: params(&[("language", "en"), ("pageSize", "50")]),
            api_key_param: "apiKey".to_string(),
            api_key_env: "NEWSAPI_KEY".to_string(),
            max_items: DEFAULT_API_MAX_ITEMS,
            mapping: FieldMapping {
                content: keys(&["description", "content"]),
                image: keys(&["urlToImage"]),
                ..FieldMapping::default()
            },
            api_key: None,
        }),
        SourceConfig::KeyedApi(KeyedApiSource {
            name: "GNews".to_string(),
            endpoint: "https://gnews.io/api/v4/top-headlines".to_string(),
            params: params(&[("country", "in"), ("lang", "en"), ("max", "50")]),
            api_key_param: "apikey".to_string(),
            api_key_env: "GNEWS_KEY".to_string(),
            max_items: DEFAULT_API_MAX_ITEMS,
            mapping: FieldMapping {
                content: keys(&["description"]),
                ..FieldMapping::default()
            },
            api_key: None,
        }),
        SourceConfig::KeyedApi(KeyedApiSource {
            name: "NewsData".to_string(),
            endpoint: "https://newsdata.io/api/1/news".to_string(),
            params: params(&[("country", "in"), ("language", "en")]),
            api_key_param: "apikey".to_string(),
            api_key_env: "NEWSDATA_KEY".to_string(),
            max_items: DEFAULT_API_MAX_ITEMS,
            mapping: FieldMapping {
                items: "results".to_string(),
                url: keys(&["link"]),
                content: keys(&["content", "description"]),
                image: keys(&["image_url"]),
                published_at: keys(&["pubDate"]),
                ..FieldMapping::default()
            },
            api_key: None,
        }),
    ];

    for sub in ["india", "worldnews", "technology", "sports"] {
        sources.push(SourceConfig::Feed(FeedSource {
            name: format!("Reddit-{sub}"),
            url: format!("https://www.reddit.com/r/{sub}/.rss"),
            max_items: REDDIT_MAX_ITEMS,
        }));
    }

    let feeds = [
        (
            "TimesOfIndia",
            "https://timesofindia.indiatimes.com/rssfeeds/-2128936835.cms",
        ),
        (
            "HindustanTimes",
            "https://www.hindustantimes.com/rss/topnews/rssfeed.xml",
        ),
        ("Reuters-World", "http://feeds.reuters.com/reuters/worldnews"),
        ("BBC-World", "http://feeds.bbci.co.uk/news/world/rss.xml"),
    ];
    for (name, url) in feeds {
        sources.push(SourceConfig::Feed(FeedSource {
            name: name.to_string(),
            url: url.to_string(),
            max_items: DEFAULT_FEED_MAX_ITEMS,
        }));
    }

    SourcesFile { sources }
}

fn validate_sources(sources_file: &SourcesFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for source in &sources_file.sources {
        let name = source.name();
        if name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source name: '{name}'"
            )));
        }

        let endpoint = source.endpoint();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "source '{name}' has non-http endpoint '{endpoint}'"
            )));
        }

        if source.max_items() == 0 {
            return Err(ConfigError::Validation(format!(
                "source '{name}' has max_items 0; must be at least 1"
            )));
        }

        if let SourceConfig::KeyedApi(api) = source {
            if api.api_key_param.trim().is_empty() || api.api_key_env.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "source '{name}' must set api_key_param and api_key_env"
                )));
            }
            if api.mapping.items.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "source '{name}' has an empty mapping.items key"
                )));
            }
        }
    }

    Ok(())
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}

fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn default_api_max_items() -> usize {
    DEFAULT_API_MAX_ITEMS
}

fn default_feed_max_items() -> usize {
    DEFAULT_FEED_MAX_ITEMS
}

#[cfg(test)]
#[path = "sources_test.rs"]
mod tests;
