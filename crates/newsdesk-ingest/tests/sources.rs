//! Integration tests for the source adapters and collector using wiremock HTTP mocks.

use std::collections::BTreeMap;
use std::time::Duration;

use newsdesk_core::{
    ArticleStore, CategoryLabel, FeedSource, FieldMapping, KeyedApiSource, SourceConfig,
};
use newsdesk_ingest::{
    build_http_client, collect_all, fetch_source, run_collection, CollectOptions, IngestError,
    JsonFileArticleStore,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client() -> reqwest::Client {
    build_http_client(30, "newsdesk-test/0.1").expect("client construction should not fail")
}

fn keyed_source(server: &MockServer, api_key: Option<&str>) -> SourceConfig {
    let mut params = BTreeMap::new();
    params.insert("country".to_string(), "in".to_string());
    SourceConfig::KeyedApi(KeyedApiSource {
        name: "GNews".to_string(),
        endpoint: format!("{}/api/v4/top-headlines", server.uri()),
        params,
        api_key_param: "apikey".to_string(),
        api_key_env: "GNEWS_KEY".to_string(),
        max_items: 50,
        mapping: FieldMapping {
            content: vec!["description".to_string()],
            ..FieldMapping::default()
        },
        api_key: api_key.map(str::to_string),
    })
}

fn feed_source(server: &MockServer, name: &str, route: &str) -> SourceConfig {
    SourceConfig::Feed(FeedSource {
        name: name.to_string(),
        url: format!("{}{route}", server.uri()),
        max_items: 30,
    })
}

const FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>World</title>
  <item><title>Gaza ceasefire talks resume</title><link>https://news.example/gaza</link>
    <description>Negotiators met again on Monday.</description></item>
  <item><title>Cricket: India win series</title><link>https://news.example/cricket</link></item>
</channel></rss>"#;

#[tokio::test]
async fn keyed_api_sends_key_and_params_and_maps_items() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "totalArticles": 2,
        "articles": [
            {
                "title": "Rupee steadies against dollar",
                "description": "The rupee held firm in early trade.",
                "url": "https://gnews.example/rupee",
                "image": "https://gnews.example/rupee.jpg",
                "publishedAt": "2026-03-04T10:15:00Z"
            },
            {
                "title": "Tech layoffs slow",
                "url": "https://gnews.example/tech"
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/api/v4/top-headlines"))
        .and(query_param("apikey", "test-key"))
        .and(query_param("country", "in"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let fetch = fetch_source(
        &test_client(),
        &keyed_source(&server, Some("test-key")),
        Duration::from_secs(5),
    )
    .await;

    assert!(fetch.error.is_none(), "unexpected error: {:?}", fetch.error);
    assert_eq!(fetch.source, "GNews");
    assert_eq!(fetch.records.len(), 2);
    assert_eq!(fetch.records[0].title, "Rupee steadies against dollar");
    assert_eq!(
        fetch.records[0].content.as_deref(),
        Some("The rupee held firm in early trade.")
    );
    assert_eq!(
        fetch.records[0].image.as_deref(),
        Some("https://gnews.example/rupee.jpg")
    );
    assert!(fetch.records[1].content.is_none());
}

#[tokio::test]
async fn keyed_api_without_key_is_unavailable_and_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let fetch = fetch_source(
        &test_client(),
        &keyed_source(&server, None),
        Duration::from_secs(5),
    )
    .await;

    assert!(fetch.records.is_empty());
    assert!(matches!(
        fetch.error,
        Some(IngestError::SourceUnavailable { ref source_name, .. }) if source_name == "GNews"
    ));
}

#[tokio::test]
async fn server_error_degrades_to_empty_yield() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetch = fetch_source(
        &test_client(),
        &keyed_source(&server, Some("test-key")),
        Duration::from_secs(5),
    )
    .await;

    assert!(fetch.records.is_empty());
    assert!(matches!(
        fetch.error,
        Some(IngestError::UnexpectedStatus { status: 503, .. })
    ));
}

#[tokio::test]
async fn non_json_body_degrades_to_empty_yield() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let fetch = fetch_source(
        &test_client(),
        &keyed_source(&server, Some("test-key")),
        Duration::from_secs(5),
    )
    .await;

    assert!(fetch.records.is_empty());
    assert!(matches!(fetch.error, Some(IngestError::Decode { .. })));
}

#[tokio::test]
async fn slow_source_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(FEED)
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let fetch = fetch_source(
        &test_client(),
        &feed_source(&server, "Slow", "/slow.xml"),
        Duration::from_millis(300),
    )
    .await;

    assert!(fetch.records.is_empty());
    assert!(matches!(fetch.error, Some(IngestError::Timeout { .. })));
}

#[tokio::test]
async fn feed_source_is_fetched_and_parsed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/world.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
        .mount(&server)
        .await;

    let fetch = fetch_source(
        &test_client(),
        &feed_source(&server, "BBC-World", "/world.xml"),
        Duration::from_secs(5),
    )
    .await;

    assert!(fetch.error.is_none());
    assert_eq!(fetch.records.len(), 2);
    assert_eq!(fetch.records[0].source, "BBC-World");
    assert_eq!(fetch.records[0].url, "https://news.example/gaza");
}

#[tokio::test]
async fn collect_all_dedups_across_sources_and_survives_failures() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/a.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/down.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let sources = vec![
        feed_source(&server, "Down", "/down.xml"),
        feed_source(&server, "A", "/a.xml"),
        feed_source(&server, "B", "/b.xml"),
    ];
    let options = CollectOptions {
        timeout_secs: 5,
        max_concurrent: 2,
    };

    let report = collect_all(&test_client(), &sources, options).await;

    assert_eq!(report.articles.len(), 2);
    assert!(report.articles.iter().all(|a| a.source == "A"));
    assert_eq!(report.duplicates_dropped, 2);
    let names: Vec<&str> = report.yields.iter().map(|y| y.source.as_str()).collect();
    assert_eq!(names, vec!["Down", "A", "B"]);
    assert_eq!(report.yields[0].fetched, 0);
    assert!(report.yields[0].error.is_some());
    assert_eq!(report.failed_sources(), 1);
}

#[tokio::test]
async fn run_collection_persists_an_enriched_pool() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let store = JsonFileArticleStore::new(dir.path().join("news_pool.json"));
    let sources = vec![feed_source(&server, "Wire", "/feed.xml")];

    let report = run_collection(&test_client(), &sources, CollectOptions::default(), &store)
        .await
        .expect("collection should succeed");
    assert_eq!(report.articles.len(), 2);

    let pool = store
        .load_categorized_articles()
        .await
        .expect("pool should load");
    assert_eq!(pool.len(), 2);
    assert_eq!(pool[0].category, Some(CategoryLabel::World));
    assert_eq!(pool[1].category, Some(CategoryLabel::Sports));
    for article in &pool {
        let synopsis = article.synopsis.as_deref().expect("synopsis set");
        assert!(synopsis.ends_with('.') && !synopsis.ends_with(".."));
    }
}
