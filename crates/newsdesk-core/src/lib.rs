//! Shared domain types, configuration, and storage contracts for newsdesk.

pub mod app_config;
pub mod article;
pub mod category;
pub mod config;
pub mod digest;
pub mod sources;
pub mod store;

pub use app_config::{AppConfig, Environment};
pub use article::{identity_key, ArticleRecord};
pub use category::CategoryLabel;
pub use config::{load_app_config, load_app_config_from_env};
pub use digest::{DigestRecord, PreferenceScore};
pub use sources::{
    default_sources, load_sources, load_sources_or_default, FeedSource, FieldMapping,
    KeyedApiSource, SourceConfig, SourcesFile,
};
pub use store::{ArticleStore, DigestInsert, DigestStore, PreferenceStore, StoreError};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sources file: {0}")]
    SourcesFileParse(#[from] serde_yaml::Error),

    #[error("sources validation failed: {0}")]
    Validation(String),

    #[error("unknown category: {0}")]
    UnknownCategory(String),
}
