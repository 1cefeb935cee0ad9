use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{ArticleRecord, CategoryLabel};

/// Running interest counter for one (user, category) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceScore {
    pub user_id: String,
    pub category: CategoryLabel,
    pub score: u64,
    pub created_at: DateTime<Utc>,
}

/// A user's reading list for one calendar day (UTC).
///
/// At most one exists per `(user_id, date)`; it is never modified after
/// creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestRecord {
    pub user_id: String,
    pub date: NaiveDate,
    pub articles: Vec<ArticleRecord>,
    pub created_at: DateTime<Utc>,
}
