//! AI explanations of article text, behind a content-addressed cache.
//!
//! The cache key is the SHA-256 of `"{mode}:{text}"`, so a repeated request
//! for the same text and mode never reaches the generator.

pub mod cache;
pub mod error;
pub mod explainer;
pub mod gemini;
pub mod mode;

pub use cache::{cache_key, CacheStore, JsonFileCache, MemoryCache};
pub use error::ExplainError;
pub use explainer::{
    Explainer, Explanation, ExplanationOrigin, EMPTY_TEXT_MESSAGE, FAILURE_MESSAGE,
};
pub use gemini::{GeminiClient, TextGenerator};
pub use mode::ExplainMode;
