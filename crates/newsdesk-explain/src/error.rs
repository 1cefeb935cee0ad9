use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generator returned HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("generator returned no text")]
    EmptyResponse,

    #[error("invalid generator response: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("unknown explain mode '{0}' (expected kid, hinglish, bullets, or plain)")]
    UnknownMode(String),

    #[error("cache I/O error at {path}: {source}")]
    CacheIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cache file is corrupt: {0}")]
    CacheCorrupt(String),
}
