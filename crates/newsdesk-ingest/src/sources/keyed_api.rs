//! Adapter for JSON REST APIs authenticated by a query-string key.
//!
//! The response shape is described entirely by the source's
//! [`FieldMapping`]; there is no per-vendor code here.

use newsdesk_core::{ArticleRecord, FieldMapping, KeyedApiSource};
use serde_json::{Map, Value};

use super::{non_blank, parse_timestamp};
use crate::error::IngestError;

pub(super) async fn fetch(
    client: &reqwest::Client,
    source: &KeyedApiSource,
) -> Result<Vec<ArticleRecord>, IngestError> {
    let Some(api_key) = source.api_key.as_deref() else {
        return Err(IngestError::SourceUnavailable {
            source_name: source.name.clone(),
            reason: format!("{} is not set", source.api_key_env),
        });
    };

    let mut query: Vec<(&str, &str)> = source
        .params
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    query.push((source.api_key_param.as_str(), api_key));

    let response = client.get(&source.endpoint).query(&query).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(IngestError::UnexpectedStatus {
            source_name: source.name.clone(),
            status: status.as_u16(),
        });
    }

    let body: Value = response.json().await.map_err(|e| IngestError::Decode {
        source_name: source.name.clone(),
        reason: e.to_string(),
    })?;

    map_items(&source.name, &source.mapping, &body, source.max_items)
}

/// Normalize a decoded response body into records.
///
/// Non-object entries in the item array are skipped. At most `max_items`
/// records are returned.
pub(super) fn map_items(
    source_name: &str,
    mapping: &FieldMapping,
    body: &Value,
    max_items: usize,
) -> Result<Vec<ArticleRecord>, IngestError> {
    let items = body
        .get(&mapping.items)
        .and_then(Value::as_array)
        .ok_or_else(|| IngestError::Decode {
            source_name: source_name.to_string(),
            reason: format!("response has no '{}' array", mapping.items),
        })?;

    let records = items
        .iter()
        .filter_map(Value::as_object)
        .take(max_items)
        .map(|item| ArticleRecord {
            source: source_name.to_string(),
            title: first_string(item, &mapping.title).unwrap_or_default(),
            url: first_string(item, &mapping.url).unwrap_or_default(),
            content: first_string(item, &mapping.content),
            description: first_string(item, &mapping.description),
            summary: None,
            image: first_string(item, &mapping.image),
            published_at: first_string(item, &mapping.published_at)
                .as_deref()
                .and_then(parse_timestamp),
            category: None,
            synopsis: None,
        })
        .collect();

    Ok(records)
}

/// First candidate key holding a non-blank string.
fn first_string(item: &Map<String, Value>, keys: &[String]) -> Option<String> {
    keys.iter()
        .filter_map(|k| item.get(k).and_then(Value::as_str))
        .find_map(non_blank)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn newsdata_mapping() -> FieldMapping {
        FieldMapping {
            items: "results".to_string(),
            url: vec!["link".to_string()],
            content: vec!["content".to_string(), "description".to_string()],
            image: vec!["image_url".to_string()],
            published_at: vec!["pubDate".to_string()],
            ..FieldMapping::default()
        }
    }

    #[test]
    fn maps_default_newsapi_shape() {
        let body = json!({
            "status": "ok",
            "articles": [{
                "title": "Chip exports rise",
                "url": "https://example.com/chips",
                "content": "Exports rose sharply.",
                "description": "Chip exports up",
                "image": "https://example.com/chips.jpg",
                "publishedAt": "2026-03-04T10:15:00Z"
            }]
        });
        let records = map_items("NewsAPI", &FieldMapping::default(), &body, 50).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.source, "NewsAPI");
        assert_eq!(r.title, "Chip exports rise");
        assert_eq!(r.url, "https://example.com/chips");
        assert_eq!(r.content.as_deref(), Some("Exports rose sharply."));
        assert_eq!(r.image.as_deref(), Some("https://example.com/chips.jpg"));
        assert!(r.published_at.is_some());
        assert!(r.category.is_none());
    }

    #[test]
    fn candidate_keys_fall_through_blank_values() {
        let body = json!({
            "results": [{
                "title": "Monsoon arrives",
                "link": "https://example.in/monsoon",
                "content": "   ",
                "description": "Rains reach Kerala.",
                "pubDate": "2026-06-01 04:00:00"
            }]
        });
        let records = map_items("NewsData", &newsdata_mapping(), &body, 50).unwrap();
        assert_eq!(records[0].url, "https://example.in/monsoon");
        assert_eq!(records[0].content.as_deref(), Some("Rains reach Kerala."));
        assert_eq!(
            records[0].published_at.map(|t| t.to_rfc3339()),
            Some("2026-06-01T04:00:00+00:00".to_string())
        );
    }

    #[test]
    fn non_object_items_are_skipped() {
        let body = json!({ "results": ["junk", 42, null, { "title": "Kept", "link": "https://x/1" }] });
        let records = map_items("NewsData", &newsdata_mapping(), &body, 50).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Kept");
    }

    #[test]
    fn non_string_fields_are_ignored() {
        let body = json!({ "articles": [{ "title": 12, "url": "https://x/1" }] });
        let records = map_items("GNews", &FieldMapping::default(), &body, 50).unwrap();
        assert_eq!(records[0].title, "");
    }

    #[test]
    fn max_items_caps_the_yield() {
        let items: Vec<Value> = (0..10)
            .map(|i| json!({ "title": format!("t{i}"), "url": format!("https://x/{i}") }))
            .collect();
        let body = json!({ "articles": items });
        let records = map_items("GNews", &FieldMapping::default(), &body, 3).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].title, "t2");
    }

    #[test]
    fn missing_item_array_is_a_decode_error() {
        let body = json!({ "status": "error", "message": "rate limited" });
        let err = map_items("GNews", &FieldMapping::default(), &body, 50).unwrap_err();
        assert!(matches!(err, IngestError::Decode { ref source_name, .. } if source_name == "GNews"));
    }
}
