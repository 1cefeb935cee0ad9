use std::sync::Arc;

use serde::Serialize;

use crate::cache::{cache_key, CacheStore};
use crate::error::ExplainError;
use crate::gemini::TextGenerator;
use crate::mode::ExplainMode;

pub const EMPTY_TEXT_MESSAGE: &str = "No content to explain.";
pub const FAILURE_MESSAGE: &str = "AI explanation failed.";

/// Cache namespace for newspaper summaries.
const NEWSPAPER_MODE: &str = "newspaper";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplanationOrigin {
    Cache,
    Generated,
    /// Blank input; nothing was generated.
    Empty,
    /// The generator failed; the text is [`FAILURE_MESSAGE`].
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    pub text: String,
    pub origin: ExplanationOrigin,
}

impl Explanation {
    fn new(text: impl Into<String>, origin: ExplanationOrigin) -> Self {
        Self {
            text: text.into(),
            origin,
        }
    }
}

/// Generator behind a content-addressed cache.
#[derive(Clone)]
pub struct Explainer {
    cache: Arc<dyn CacheStore>,
    generator: Arc<dyn TextGenerator>,
}

impl Explainer {
    #[must_use]
    pub fn new(cache: Arc<dyn CacheStore>, generator: Arc<dyn TextGenerator>) -> Self {
        Self { cache, generator }
    }

    /// Explain `text` in the given mode. Never fails.
    ///
    /// Blank text short-circuits. Generator failures return
    /// [`FAILURE_MESSAGE`] and are not cached, so the next call retries.
    pub async fn explain(&self, text: &str, mode: ExplainMode) -> Explanation {
        if text.trim().is_empty() {
            return Explanation::new(EMPTY_TEXT_MESSAGE, ExplanationOrigin::Empty);
        }

        let key = cache_key(mode.as_str(), text);
        match self.cached_or_generate(&key, &mode.prompt(text)).await {
            Ok(explanation) => {
                tracing::debug!(mode = %mode, origin = ?explanation.origin, "explanation ready");
                explanation
            }
            Err(e) => {
                tracing::warn!(mode = %mode, error = %e, "explanation failed");
                Explanation::new(FAILURE_MESSAGE, ExplanationOrigin::Failed)
            }
        }
    }

    /// A 2-4 sentence newspaper-style summary of one article, cached under
    /// the `newspaper` namespace.
    ///
    /// # Errors
    ///
    /// Returns [`ExplainError`] if generation fails; callers fall back to
    /// the article's stored synopsis.
    pub async fn newspaper_summary(
        &self,
        title: &str,
        content: &str,
        source: &str,
    ) -> Result<Explanation, ExplainError> {
        let prompt = newspaper_prompt(title, content, source);
        let key = cache_key(NEWSPAPER_MODE, &prompt);
        self.cached_or_generate(&key, &prompt).await
    }

    async fn cached_or_generate(
        &self,
        key: &str,
        prompt: &str,
    ) -> Result<Explanation, ExplainError> {
        match self.cache.get(key).await {
            Ok(Some(hit)) => return Ok(Explanation::new(hit, ExplanationOrigin::Cache)),
            Ok(None) => {}
            // An unreadable cache only costs a generator call.
            Err(e) => tracing::warn!(error = %e, "explain cache read failed"),
        }

        let text = self.generator.generate(prompt).await?;
        let text = text.trim().to_string();

        if let Err(e) = self.cache.put(key, &text).await {
            tracing::warn!(error = %e, "explain cache write failed");
        }
        Ok(Explanation::new(text, ExplanationOrigin::Generated))
    }
}

fn newspaper_prompt(title: &str, content: &str, source: &str) -> String {
    format!(
        "You are a professional newspaper editor.\n\n\
         Write a concise newspaper-style summary for the following news article.\n\n\
         RULES:\n\
         - 2 to 4 complete sentences\n\
         - Factual and neutral tone\n\
         - No ellipsis (...)\n\
         - No phrases like \"this article reports\"\n\
         - No speculation\n\
         - No promotional language\n\
         - Write as if it appears in a printed newspaper\n\n\
         Headline:\n{title}\n\n\
         Source:\n{source}\n\n\
         Article Content (may be incomplete):\n{content}\n\n\
         Write the final newspaper summary:\n"
    )
}
