//! Display synopsis selection.
//!
//! Every article gets exactly one synopsis, chosen from the first usable tier:
//!
//! 1. the upstream summary, when it is longer than [`MIN_SUMMARY_CHARS`];
//! 2. up to [`MAX_LEAD_SENTENCES`] lead sentences of the content, skipping
//!    sentences shorter than [`MIN_LEAD_SENTENCE_CHARS`];
//! 3. a sentence built from the headline (text before its first colon)
//!    naming the source;
//! 4. [`GENERIC_FALLBACK`].
//!
//! The result is never empty and always ends with exactly one `.`; the
//! rendering layer relies on both.

use std::sync::LazyLock;

use newsdesk_core::ArticleRecord;
use regex::Regex;

const MIN_SUMMARY_CHARS: usize = 80;
const MIN_LEAD_SENTENCE_CHARS: usize = 40;
const MAX_LEAD_SENTENCES: usize = 2;
const UNKNOWN_SOURCE: &str = "the news outlet";
const GENERIC_FALLBACK: &str = "Key developments were reported in this story.";

/// Sentence-ending punctuation followed by whitespace.
static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("valid regex"));

/// Choose the synopsis for an article. Pure.
#[must_use]
pub fn select_summary(article: &ArticleRecord) -> String {
    if let Some(summary) = article
        .summary
        .as_deref()
        .map(str::trim)
        .filter(|s| s.chars().count() > MIN_SUMMARY_CHARS)
        .and_then(with_single_period)
    {
        return summary;
    }

    if let Some(lead) = article.content.as_deref().and_then(lead_sentences) {
        return lead;
    }

    headline_fallback(&article.title, &article.source)
        .unwrap_or_else(|| GENERIC_FALLBACK.to_string())
}

fn lead_sentences(content: &str) -> Option<String> {
    let lead: Vec<&str> = split_sentences(content.trim())
        .into_iter()
        .map(str::trim)
        .filter(|s| s.chars().count() >= MIN_LEAD_SENTENCE_CHARS)
        .take(MAX_LEAD_SENTENCES)
        .collect();

    if lead.is_empty() {
        return None;
    }
    with_single_period(&lead.join(" "))
}

/// Split after each `.`, `!` or `?` that is followed by whitespace. The
/// punctuation stays with its sentence.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for found in SENTENCE_BREAK.find_iter(text) {
        // The matched punctuation is a single ASCII byte.
        sentences.push(&text[start..=found.start()]);
        start = found.end();
    }
    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

fn headline_fallback(title: &str, source: &str) -> Option<String> {
    let headline = title.split(':').next().map(strip_terminal)?;
    if headline.is_empty() {
        return None;
    }

    let source = strip_terminal(source);
    let source = if source.is_empty() {
        UNKNOWN_SOURCE
    } else {
        source
    };

    Some(format!(
        "{headline}. The story reports key developments as covered by {source}."
    ))
}

/// Replace any run of terminal punctuation with a single `.`.
///
/// Returns `None` when nothing but punctuation and whitespace remains.
fn with_single_period(text: &str) -> Option<String> {
    let body = strip_terminal(text);
    if body.is_empty() {
        None
    } else {
        Some(format!("{body}."))
    }
}

fn strip_terminal(text: &str) -> &str {
    text.trim()
        .trim_end_matches(|c: char| matches!(c, '.' | '!' | '?' | '…') || c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(
        summary: Option<&str>,
        content: Option<&str>,
        title: &str,
        source: &str,
    ) -> ArticleRecord {
        let mut a = ArticleRecord::new(source, title, "");
        a.summary = summary.map(str::to_string);
        a.content = content.map(str::to_string);
        a
    }

    fn assert_well_formed(out: &str) {
        assert!(!out.is_empty(), "synopsis must not be empty");
        assert!(out.ends_with('.'), "synopsis must end with '.': {out:?}");
        assert!(
            !out.ends_with(".."),
            "synopsis must end with exactly one '.': {out:?}"
        );
    }

    #[test]
    fn long_summary_is_used_with_single_period() {
        let summary = "The central bank held rates steady on Thursday, citing persistent inflation in services...  ";
        let out = select_summary(&article(Some(summary), Some("ignored"), "T", "S"));
        assert_eq!(
            out,
            "The central bank held rates steady on Thursday, citing persistent inflation in services."
        );
    }

    #[test]
    fn summary_of_exactly_80_chars_is_not_used() {
        let summary = "a".repeat(80);
        let out = select_summary(&article(Some(&summary), None, "Headline", "Wire"));
        assert_eq!(
            out,
            "Headline. The story reports key developments as covered by Wire."
        );
    }

    #[test]
    fn lead_sentences_skip_short_ones_and_take_two() {
        let content = "Short intro. The council approved the new transit budget after a long debate. \
                       Officials said construction would begin next spring across the city. \
                       A third sentence that is also long enough to qualify here.";
        let out = select_summary(&article(None, Some(content), "T", "S"));
        assert_eq!(
            out,
            "The council approved the new transit budget after a long debate. \
             Officials said construction would begin next spring across the city."
        );
    }

    #[test]
    fn lead_sentence_gets_period_appended() {
        let content = "Rescue teams reached the stranded villagers late on Sunday night";
        let out = select_summary(&article(None, Some(content), "T", "S"));
        assert_eq!(
            out,
            "Rescue teams reached the stranded villagers late on Sunday night."
        );
    }

    #[test]
    fn exclamation_ending_is_normalized() {
        let content = "The home side completed an astonishing comeback in the final over!";
        let out = select_summary(&article(None, Some(content), "T", "S"));
        assert_eq!(
            out,
            "The home side completed an astonishing comeback in the final over."
        );
    }

    #[test]
    fn short_content_falls_back_to_headline() {
        let out = select_summary(&article(
            Some(""),
            Some("Short."),
            "Markets fall: stocks drop",
            "Reuters",
        ));
        assert_eq!(
            out,
            "Markets fall. The story reports key developments as covered by Reuters."
        );
    }

    #[test]
    fn missing_source_uses_generic_outlet() {
        let out = select_summary(&article(None, None, "Rates hold", "  "));
        assert_eq!(
            out,
            "Rates hold. The story reports key developments as covered by the news outlet."
        );
    }

    #[test]
    fn headline_with_trailing_period_does_not_double_up() {
        let out = select_summary(&article(None, None, "Rates hold.", "Wire."));
        assert_eq!(
            out,
            "Rates hold. The story reports key developments as covered by Wire."
        );
    }

    #[test]
    fn everything_missing_yields_generic_sentence() {
        let out = select_summary(&article(None, None, "", ""));
        assert_eq!(out, GENERIC_FALLBACK);
    }

    #[test]
    fn title_starting_with_colon_yields_generic_sentence() {
        let out = select_summary(&article(None, None, ": nothing before", "Wire"));
        assert_eq!(out, GENERIC_FALLBACK);
    }

    #[test]
    fn punctuation_only_summary_is_unusable() {
        let summary = ".".repeat(100);
        let out = select_summary(&article(Some(&summary), None, "Headline", "Wire"));
        assert!(out.starts_with("Headline."));
    }

    #[test]
    fn output_is_always_well_formed() {
        let long = "x".repeat(120);
        let cases = [
            article(None, None, "", ""),
            article(Some(""), Some(""), "", ""),
            article(Some("   "), Some("   "), "  ", "  "),
            article(Some(&long), None, "", ""),
            article(Some("ends with many dots........................................................................."), None, "", ""),
            article(None, Some("?!?!"), "Title?!", "Source..."),
            article(None, Some("Ünïcödé sentence that is comfortably longer than forty chars…"), "", ""),
            article(None, None, "Just a headline", ""),
        ];
        for case in &cases {
            assert_well_formed(&select_summary(case));
        }
    }

    #[test]
    fn select_summary_is_pure() {
        let a = article(None, Some("Some content that is long enough to be a lead sentence."), "T", "S");
        assert_eq!(select_summary(&a), select_summary(&a));
    }
}
