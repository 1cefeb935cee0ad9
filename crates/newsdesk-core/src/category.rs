use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Topical label assigned to every article. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryLabel {
    Sports,
    Tech,
    India,
    World,
    General,
}

impl CategoryLabel {
    pub const ALL: [CategoryLabel; 5] = [
        CategoryLabel::Sports,
        CategoryLabel::Tech,
        CategoryLabel::India,
        CategoryLabel::World,
        CategoryLabel::General,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryLabel::Sports => "sports",
            CategoryLabel::Tech => "tech",
            CategoryLabel::India => "india",
            CategoryLabel::World => "world",
            CategoryLabel::General => "general",
        }
    }
}

impl std::fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryLabel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        CategoryLabel::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ConfigError::UnknownCategory(s.to_string()))
    }
}
