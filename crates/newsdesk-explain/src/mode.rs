use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExplainError;

/// How the explanation should be phrased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplainMode {
    Kid,
    Hinglish,
    Bullets,
    /// The text is sent as-is.
    #[default]
    Plain,
}

impl ExplainMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExplainMode::Kid => "kid",
            ExplainMode::Hinglish => "hinglish",
            ExplainMode::Bullets => "bullets",
            ExplainMode::Plain => "plain",
        }
    }

    #[must_use]
    pub fn prompt(self, text: &str) -> String {
        match self {
            ExplainMode::Kid => format!("Explain like I am 5 years old:\n{text}"),
            ExplainMode::Hinglish => {
                format!("Explain in simple Hinglish (Hindi + English):\n{text}")
            }
            ExplainMode::Bullets => format!("Explain in short bullet points:\n{text}"),
            ExplainMode::Plain => text.to_string(),
        }
    }
}

impl fmt::Display for ExplainMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExplainMode {
    type Err = ExplainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kid" => Ok(ExplainMode::Kid),
            "hinglish" => Ok(ExplainMode::Hinglish),
            "bullets" => Ok(ExplainMode::Bullets),
            "plain" => Ok(ExplainMode::Plain),
            other => Err(ExplainError::UnknownMode(other.to_string())),
        }
    }
}
