//! Fan-out over all configured sources, then merge and deduplicate.

use std::collections::HashSet;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use newsdesk_core::{identity_key, SourceConfig};

use crate::sources::fetch_source;
use crate::types::{CollectOptions, CollectionReport, SourceFetch, SourceYield};

/// Fetch every source concurrently and merge the results.
///
/// At most `options.max_concurrent` sources are in flight; each is bounded
/// by `options.timeout_secs`. The merge waits for every source to finish or
/// time out. Source failures never fail the run.
pub async fn collect_all(
    client: &reqwest::Client,
    sources: &[SourceConfig],
    options: CollectOptions,
) -> CollectionReport {
    let timeout = Duration::from_secs(options.timeout_secs);

    // `buffered` (not `buffer_unordered`) keeps results in configured order,
    // which decides who wins a duplicate.
    let fetches: Vec<SourceFetch> = stream::iter(sources)
        .map(|source| fetch_source(client, source, timeout))
        .buffered(options.max_concurrent.max(1))
        .boxed()
        .collect()
        .await;

    merge_yields(fetches)
}

/// Merge per-source yields in the order given.
///
/// The first record seen for an identity key is kept; later ones are
/// counted as duplicates. Records with neither url nor title are counted as
/// malformed and dropped.
#[must_use]
pub fn merge_yields(fetches: Vec<SourceFetch>) -> CollectionReport {
    let mut seen = HashSet::new();
    let mut report = CollectionReport::default();

    for fetch in fetches {
        report.yields.push(SourceYield {
            source: fetch.source.clone(),
            fetched: fetch.records.len(),
            error: fetch.error.as_ref().map(ToString::to_string),
        });

        for record in fetch.records {
            let Some(key) = identity_key(&record) else {
                report.malformed_dropped += 1;
                continue;
            };
            if seen.insert(key) {
                report.articles.push(record);
            } else {
                report.duplicates_dropped += 1;
            }
        }
    }

    tracing::info!(
        sources = report.yields.len(),
        failed = report.failed_sources(),
        articles = report.articles.len(),
        duplicates = report.duplicates_dropped,
        malformed = report.malformed_dropped,
        "collection merged"
    );

    report
}

#[cfg(test)]
mod tests {
    use newsdesk_core::ArticleRecord;

    use super::*;
    use crate::error::IngestError;

    fn rec(source: &str, title: &str, url: &str) -> ArticleRecord {
        ArticleRecord::new(source, title, url)
    }

    #[test]
    fn identical_records_collapse_to_one() {
        let fetch = SourceFetch::ok(
            "A",
            vec![rec("A", "A", "http://x/1"), rec("A", "A", "http://x/1")],
        );
        let report = merge_yields(vec![fetch]);
        assert_eq!(report.articles.len(), 1);
        assert_eq!(report.duplicates_dropped, 1);
        assert_eq!(report.yields[0].fetched, 2);
    }

    #[test]
    fn first_source_in_configured_order_wins() {
        let first = SourceFetch::ok("First", vec![rec("First", "Story", "https://x/story/")]);
        let second = SourceFetch::ok("Second", vec![rec("Second", "Story v2", "HTTPS://X/story")]);
        let report = merge_yields(vec![first, second]);
        assert_eq!(report.articles.len(), 1);
        assert_eq!(report.articles[0].source, "First");
    }

    #[test]
    fn title_is_the_key_when_url_is_blank() {
        let a = SourceFetch::ok(
            "A",
            vec![rec("A", "Budget  passed", ""), rec("A", "budget passed ", "  ")],
        );
        let report = merge_yields(vec![a]);
        assert_eq!(report.articles.len(), 1);
    }

    #[test]
    fn records_without_url_and_title_are_malformed() {
        let a = SourceFetch::ok("A", vec![rec("A", " ", ""), rec("A", "Kept", "")]);
        let report = merge_yields(vec![a]);
        assert_eq!(report.articles.len(), 1);
        assert_eq!(report.malformed_dropped, 1);
        assert_eq!(report.duplicates_dropped, 0);
    }

    #[test]
    fn failed_source_contributes_an_empty_yield() {
        let ok = SourceFetch::ok("Up", vec![rec("Up", "One", "https://x/1")]);
        let down = SourceFetch::unavailable(
            "Down",
            IngestError::Timeout {
                source_name: "Down".to_string(),
                secs: 12,
            },
        );
        let report = merge_yields(vec![ok, down]);
        assert_eq!(report.articles.len(), 1);
        assert_eq!(report.failed_sources(), 1);
        assert_eq!(report.yields[1].fetched, 0);
        assert!(report.yields[1].error.as_deref().unwrap().contains("timed out"));
    }

    #[test]
    fn merged_batch_never_repeats_an_identity_key() {
        let fetches = (0..4)
            .map(|s| {
                let records = (0..20)
                    .map(|i| rec("S", &format!("t{}", i % 7), &format!("https://x/{}", i % 5)))
                    .collect();
                SourceFetch::ok(format!("S{s}"), records)
            })
            .collect();
        let report = merge_yields(fetches);
        let keys: HashSet<String> = report.articles.iter().filter_map(identity_key).collect();
        assert_eq!(keys.len(), report.articles.len());
        assert_eq!(report.articles.len(), 5);
        assert_eq!(report.duplicates_dropped, 75);
    }

    #[tokio::test]
    async fn empty_source_list_yields_empty_report() {
        let client = reqwest::Client::new();
        let report = collect_all(&client, &[], CollectOptions::default()).await;
        assert!(report.articles.is_empty());
        assert!(report.yields.is_empty());
    }
}
