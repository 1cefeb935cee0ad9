//! Personalization for newsdesk: per-user category preferences and the
//! once-a-day digest built from them.

pub mod builder;
pub mod error;
pub mod ledger;
pub mod memory;

pub use builder::{select_articles, DigestBuilder, DigestOutcome, DEFAULT_DIGEST_CAP};
pub use error::DigestError;
pub use ledger::PreferenceLedger;
pub use memory::{MemoryDigestStore, MemoryPreferenceStore};
