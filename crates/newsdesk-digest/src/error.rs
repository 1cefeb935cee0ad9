use newsdesk_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DigestError {
    #[error("signal weight must be at least 1")]
    InvalidWeight,

    #[error("user id must be non-empty")]
    InvalidUser,

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
