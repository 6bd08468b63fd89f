use chrono::{DateTime, Utc};
use feed_rs::model::Entry;
use feed_rs::parser;
use html_escape::decode_html_entities;

use crate::app::{AppError, Result};

/// One article as read from a feed, before it is attributed to a friend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub author: String,
    /// Published time, falling back to the updated time.
    pub created: Option<DateTime<Utc>>,
    /// Updated time, falling back to the published time.
    pub updated: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Parse an RSS, Atom or JSON Feed document. At most `max_items` entries
    /// are returned in document order; `0` means no limit.
    pub fn normalize(&self, body: &[u8], max_items: usize) -> Result<Vec<FeedEntry>> {
        let feed = parser::parse(body).map_err(|e| AppError::FeedParse(e.to_string()))?;

        let limit = if max_items == 0 {
            usize::MAX
        } else {
            max_items
        };

        Ok(feed
            .entries
            .into_iter()
            .take(limit)
            .map(Self::entry)
            .collect())
    }

    fn entry(entry: Entry) -> FeedEntry {
        let published = entry.published.map(|dt| dt.with_timezone(&Utc));
        let updated = entry.updated.map(|dt| dt.with_timezone(&Utc));

        let author = entry
            .authors
            .first()
            .map(|a| {
                if a.name.trim().is_empty() {
                    a.email.clone().unwrap_or_default()
                } else {
                    a.name.clone()
                }
            })
            .unwrap_or_default();

        FeedEntry {
            title: entry
                .title
                .map(|t| decode_html_entities(t.content.trim()).to_string())
                .unwrap_or_default(),
            link: entry
                .links
                .first()
                .map(|l| l.href.trim().to_string())
                .unwrap_or_default(),
            author: author.trim().to_string(),
            created: published.or(updated),
            updated: updated.or(published),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test Feed</title>
    <link>https://example.com</link>
    <description>A test feed</description>
    <item>
      <title>  Fish &amp; Chips  </title>
      <link>https://example.com/item1</link>
      <guid>item-1</guid>
      <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Test Item 2</title>
      <link>https://example.com/item2</link>
      <guid>item-2</guid>
    </item>
    <item>
      <title>Test Item 3</title>
      <link>https://example.com/item3</link>
    </item>
  </channel>
</rss>"#;

    const ATOM_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Test Feed</title>
  <id>urn:test</id>
  <updated>2024-01-02T00:00:00Z</updated>
  <entry>
    <title>Atom Entry 1</title>
    <link href="https://example.com/atom1"/>
    <id>atom-entry-1</id>
    <updated>2024-01-02T00:00:00Z</updated>
    <published>2024-01-01T00:00:00Z</published>
    <author><name>Bob</name></author>
  </entry>
</feed>"#;

    const JSON_SAMPLE: &str = r#"{
  "version": "https://jsonfeed.org/version/1.1",
  "title": "JSON Feed",
  "items": [
    {"id": "1", "title": "x", "url": "http://e/1", "date_published": "2024-03-01T00:00:00Z"}
  ]
}"#;

    #[test]
    fn test_parse_rss() {
        let items = Normalizer::new().normalize(RSS_SAMPLE.as_bytes(), 0).unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].title, "Fish & Chips");
        assert_eq!(items[0].link, "https://example.com/item1");
        let jan1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(items[0].created, Some(jan1));
        assert_eq!(items[0].updated, Some(jan1));
        assert_eq!(items[1].created, None);
    }

    #[test]
    fn test_parse_atom_picks_published_for_created() {
        let items = Normalizer::new().normalize(ATOM_SAMPLE.as_bytes(), 0).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Atom Entry 1");
        assert_eq!(items[0].link, "https://example.com/atom1");
        assert_eq!(items[0].author, "Bob");
        assert_eq!(
            items[0].created,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            items[0].updated,
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_json_feed() {
        let items = Normalizer::new().normalize(JSON_SAMPLE.as_bytes(), 0).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].link, "http://e/1");
    }

    #[test]
    fn test_max_items_caps_in_document_order() {
        let items = Normalizer::new().normalize(RSS_SAMPLE.as_bytes(), 2).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].link, "https://example.com/item2");
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        let err = Normalizer::new()
            .normalize(b"<html><body>not a feed</body></html>", 0)
            .unwrap_err();
        assert!(matches!(err, AppError::FeedParse(_)));
    }
}
