use newsdesk_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("unexpected HTTP status {status} from {source_name}")]
    UnexpectedStatus { source_name: String, status: u16 },

    #[error("response from {source_name} could not be decoded: {reason}")]
    Decode { source_name: String, reason: String },

    #[error("source {source_name} unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    #[error("source {source_name} timed out after {secs}s")]
    Timeout { source_name: String, secs: u64 },

    #[error("article store error: {0}")]
    Store(#[from] StoreError),
}
