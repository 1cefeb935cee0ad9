//! Rule-based topical categorizer.

use newsdesk_core::{ArticleRecord, CategoryLabel};

/// Ordered `(label, keywords)` rules. The first rule with any keyword
/// present in the article text wins; nothing matching means
/// [`CategoryLabel::General`].
///
/// Keywords are lowercase substrings of `lower(title) + " " + lower(source)`,
/// so `tech` matches a `Reddit-technology` source and `game` matches "games".
/// Short keywords hit inside longer words too ("ai" in "Mumbai").
pub const CATEGORY_RULES: &[(CategoryLabel, &[&str])] = &[
    (
        CategoryLabel::Sports,
        &[
            "nfl", "match", "game", "score", "win", "lose", "football", "cricket",
        ],
    ),
    (
        CategoryLabel::Tech,
        &[
            "tech",
            "robot",
            "ai",
            "software",
            "iphone",
            "google",
            "microsoft",
        ],
    ),
    (
        CategoryLabel::India,
        &["india", "delhi", "mumbai", "bjp", "congress", "rupee"],
    ),
    (
        CategoryLabel::World,
        &["ukraine", "israel", "gaza", "china", "russia", "global", "un"],
    ),
];

/// Assign exactly one category to an article.
///
/// Pure: the same title and source always produce the same label, so
/// records re-read from the pool can be re-categorized safely.
#[must_use]
pub fn categorize(article: &ArticleRecord) -> CategoryLabel {
    categorize_text(&article.title, &article.source)
}

fn categorize_text(title: &str, source: &str) -> CategoryLabel {
    let text = format!("{} {}", title.to_lowercase(), source.to_lowercase());

    CATEGORY_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map_or(CategoryLabel::General, |(label, _)| *label)
}
