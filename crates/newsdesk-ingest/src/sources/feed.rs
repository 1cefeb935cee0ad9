//! RSS 2.0 and Atom feed adapter.
//!
//! Handles `<item>` and `<entry>` alike, so Reddit's `.rss` listings (Atom)
//! and publisher RSS feeds share one parser. Channel-level elements outside
//! an item are ignored.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use newsdesk_core::{ArticleRecord, FeedSource};

use super::{non_blank, parse_timestamp};
use crate::error::IngestError;

pub(super) async fn fetch(
    client: &reqwest::Client,
    source: &FeedSource,
) -> Result<Vec<ArticleRecord>, IngestError> {
    let response = client.get(&source.url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(IngestError::UnexpectedStatus {
            source_name: source.name.clone(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await?;
    parse_feed(&body, &source.name, source.max_items)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Description,
    Summary,
    Content,
    Encoded,
    Published,
}

fn field_for(name: &[u8]) -> Option<Field> {
    match name {
        b"title" => Some(Field::Title),
        b"link" => Some(Field::Link),
        b"description" => Some(Field::Description),
        b"summary" => Some(Field::Summary),
        b"content" => Some(Field::Content),
        b"content:encoded" => Some(Field::Encoded),
        b"pubDate" | b"published" | b"updated" | b"dc:date" => Some(Field::Published),
        _ => None,
    }
}

/// Text collected for the item currently being read.
#[derive(Debug, Default)]
struct EntryBuf {
    title: String,
    link: String,
    description: String,
    summary: String,
    content: String,
    encoded: String,
    published: String,
    image: Option<String>,
}

impl EntryBuf {
    fn push_text(&mut self, field: Field, text: &str) {
        let slot = match field {
            // Single-valued: the first occurrence wins (`published` before `updated`).
            Field::Link | Field::Published => {
                let slot = if field == Field::Link {
                    &mut self.link
                } else {
                    &mut self.published
                };
                if slot.is_empty() {
                    slot.push_str(text.trim());
                }
                return;
            }
            Field::Title => &mut self.title,
            Field::Description => &mut self.description,
            Field::Summary => &mut self.summary,
            Field::Content => &mut self.content,
            Field::Encoded => &mut self.encoded,
        };
        // Text nodes split by nested markup are joined with a space.
        if !slot.is_empty() {
            slot.push(' ');
        }
        slot.push_str(text);
    }

    /// Atom `<link href>`; only the `alternate` relation points at the article.
    fn take_link_href(&mut self, e: &BytesStart<'_>) {
        if attr(e, "rel").is_some_and(|rel| rel != "alternate") {
            return;
        }
        if self.link.is_empty() {
            if let Some(href) = attr(e, "href") {
                self.link = href.trim().to_string();
            }
        }
    }

    fn take_image(&mut self, e: &BytesStart<'_>) {
        if self.image.is_some() {
            return;
        }
        let is_image = e.name().as_ref() == b"media:thumbnail"
            || attr(e, "type").is_some_and(|t| t.starts_with("image/"))
            || attr(e, "medium").is_some_and(|m| m == "image");
        if is_image {
            self.image = attr(e, "url").as_deref().and_then(non_blank);
        }
    }

    fn into_record(self, source: &str) -> ArticleRecord {
        let teaser = clean(&self.description).or_else(|| clean(&self.summary));
        let content = clean(&self.encoded)
            .or_else(|| clean(&self.content))
            .or_else(|| teaser.clone());

        // Feed teasers are lead text, not editorial summaries; leave `summary`
        // unset so the synopsis is cut from the leading sentences.
        ArticleRecord {
            source: source.to_string(),
            title: strip_html(&self.title),
            url: self.link,
            content,
            description: teaser,
            summary: None,
            image: self.image,
            published_at: parse_timestamp(&self.published),
            category: None,
            synopsis: None,
        }
    }
}

/// Parse a feed body into records, stopping after `max_items`.
///
/// Items are returned even when title or link is missing; the collector
/// decides what is malformed.
pub(super) fn parse_feed(
    xml: &str,
    source: &str,
    max_items: usize,
) -> Result<Vec<ArticleRecord>, IngestError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut entry: Option<EntryBuf> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                match name.as_ref() {
                    b"item" | b"entry" => {
                        entry = Some(EntryBuf::default());
                        field = None;
                    }
                    other => {
                        if let Some(buf) = entry.as_mut() {
                            if field.is_none() {
                                field = field_for(other);
                            }
                            match other {
                                b"link" => buf.take_link_href(&e),
                                b"media:content" | b"media:thumbnail" => buf.take_image(&e),
                                _ => {}
                            }
                        }
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                if let Some(buf) = entry.as_mut() {
                    match e.name().as_ref() {
                        b"link" => buf.take_link_href(&e),
                        b"enclosure" | b"media:content" | b"media:thumbnail" => buf.take_image(&e),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                match name.as_ref() {
                    b"item" | b"entry" => {
                        if let Some(buf) = entry.take() {
                            records.push(buf.into_record(source));
                            if records.len() >= max_items {
                                break;
                            }
                        }
                        field = None;
                    }
                    other => {
                        if field.is_some() && field_for(other) == field {
                            field = None;
                        }
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if let (Some(buf), Some(f)) = (entry.as_mut(), field) {
                    let text = e.unescape().unwrap_or_default();
                    buf.push_text(f, &text);
                }
            }
            Ok(Event::CData(e)) => {
                if let (Some(buf), Some(f)) = (entry.as_mut(), field) {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    buf.push_text(f, &text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(IngestError::Xml(e)),
            _ => {}
        }
    }

    Ok(records)
}

fn attr(e: &BytesStart<'_>, key: &str) -> Option<String> {
    e.try_get_attribute(key)
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok().map(std::borrow::Cow::into_owned))
}

fn clean(raw: &str) -> Option<String> {
    non_blank(&strip_html(raw))
}

/// Strip HTML tags from a string and normalize whitespace.
pub(crate) fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
