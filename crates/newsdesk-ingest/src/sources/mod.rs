//! Source adapters.
//!
//! One adapter per [`SourceConfig`] variant. [`fetch_source`] is the only
//! entry point: it bounds the adapter by a timeout and turns every failure
//! into an empty, logged yield.

mod feed;
mod keyed_api;

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use newsdesk_core::SourceConfig;

use crate::error::IngestError;
use crate::types::SourceFetch;

/// Build the HTTP client shared by all adapters in a run.
///
/// # Errors
///
/// Returns [`IngestError::Http`] if the client cannot be constructed.
pub fn build_http_client(timeout_secs: u64, user_agent: &str) -> Result<reqwest::Client, IngestError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Fetch and normalize one source. Never fails.
///
/// Network, status, decode, and timeout failures all produce an empty
/// yield carrying the error, logged at `warn` with the source name.
pub async fn fetch_source(
    client: &reqwest::Client,
    source: &SourceConfig,
    timeout: Duration,
) -> SourceFetch {
    let name = source.name();

    let fetched = match source {
        SourceConfig::KeyedApi(api) => {
            tokio::time::timeout(timeout, keyed_api::fetch(client, api)).await
        }
        SourceConfig::Feed(feed) => tokio::time::timeout(timeout, feed::fetch(client, feed)).await,
    };

    let result = fetched.unwrap_or_else(|_| {
        Err(IngestError::Timeout {
            source_name: name.to_string(),
            secs: timeout.as_secs(),
        })
    });

    match result {
        Ok(records) => {
            tracing::info!(source = name, count = records.len(), "source fetched");
            SourceFetch::ok(name, records)
        }
        Err(e) => {
            tracing::warn!(source = name, count = 0, error = %e, "source unavailable");
            SourceFetch::unavailable(name, e)
        }
    }
}

/// Parse the timestamp formats upstreams actually send: RFC 3339
/// (`publishedAt`, Atom), RFC 2822 (RSS `pubDate`), and NewsData's bare
/// `YYYY-MM-DD HH:MM:SS`, which is UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_rfc2822(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Trimmed value, or `None` when blank.
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn parses_rfc3339() {
        let ts = parse_timestamp("2026-03-04T10:15:00Z").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day(), ts.hour()), (2026, 3, 4, 10));
    }

    #[test]
    fn parses_rfc2822_and_converts_to_utc() {
        let ts = parse_timestamp("Wed, 04 Mar 2026 15:45:00 +0530").unwrap();
        assert_eq!((ts.hour(), ts.minute()), (10, 15));
    }

    #[test]
    fn parses_bare_datetime_as_utc() {
        let ts = parse_timestamp("2026-03-04 10:15:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-03-04T10:15:00+00:00");
    }

    #[test]
    fn garbage_timestamp_is_none() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("   ").is_none());
    }

    #[test]
    fn non_blank_trims() {
        assert_eq!(non_blank("  a b "), Some("a b".to_string()));
        assert_eq!(non_blank(" \n"), None);
    }
}
