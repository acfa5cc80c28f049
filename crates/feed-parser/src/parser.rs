// crates/feed-parser/src/parser.rs
//! Feed parsing logic

use crate::error::{FeedError, FeedResult};
use crate::feed::{Enclosure, Feed, FeedItem, FeedType};
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;

/// Feed parser
pub struct FeedParser;

impl FeedParser {
    /// Parses a feed from a string
    pub fn parse(content: &str) -> FeedResult<Feed> {
        if content.trim().is_empty() {
            return Err(FeedError::InvalidXml("document is empty".to_string()));
        }

        match Self::detect_type(content) {
            FeedType::Rss => Self::parse_rss(content),
            FeedType::Atom => Self::parse_atom(content),
            FeedType::Unknown => Err(FeedError::UnsupportedFormat(
                "Unknown feed format".to_string(),
            )),
        }
    }

    /// Detects the feed type from content
    fn detect_type(content: &str) -> FeedType {
        if content.contains("<rss") || content.contains("<rdf:RDF") {
            FeedType::Rss
        } else if content.contains("<feed") && content.contains("2005/Atom") {
            FeedType::Atom
        } else {
            FeedType::Unknown
        }
    }

    /// Parses an RSS feed
    fn parse_rss(content: &str) -> FeedResult<Feed> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut feed = Feed::new(FeedType::Rss, String::new());
        let mut current_item: Option<FeedItem> = None;
        let mut text_buffer = String::new();
        let mut in_image = false;

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    text_buffer.clear();
                    match e.name().as_ref() {
                        b"item" => current_item = Some(FeedItem::default()),
                        b"image" => in_image = true,
                        b"enclosure" => Self::push_rss_enclosure(&e, current_item.as_mut()),
                        _ => {}
                    }
                }
                Ok(Event::Empty(e)) => {
                    // <enclosure ... /> is almost always self-closing
                    if e.name().as_ref() == b"enclosure" {
                        Self::push_rss_enclosure(&e, current_item.as_mut());
                    }
                }
                Ok(Event::Text(e)) => text_buffer.push_str(&Self::decode_text(&e)),
                Ok(Event::CData(e)) => text_buffer.push_str(&String::from_utf8_lossy(&e)),
                Ok(Event::End(e)) => {
                    let text = std::mem::take(&mut text_buffer);
                    let text = text.trim();
                    let name = e.name();
                    let name = name.as_ref();

                    if name == b"item" {
                        if let Some(item) = current_item.take() {
                            feed.add_item(item);
                        }
                    } else if let Some(item) = current_item.as_mut() {
                        Self::apply_rss_item_field(item, name, text);
                    } else if name == b"image" {
                        in_image = false;
                    } else if !in_image {
                        match name {
                            b"title" if feed.title.is_empty() => feed.title = text.to_string(),
                            b"description" => feed.description = non_empty(text),
                            b"link" => feed.url = non_empty(text),
                            b"language" => feed.language = non_empty(text),
                            b"lastBuildDate" => feed.updated = parse_rfc2822(text),
                            _ => {}
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(FeedError::from(e)),
                _ => {}
            }
            buf.clear();
        }

        if feed.title.is_empty() {
            return Err(FeedError::MissingField("title".to_string()));
        }

        Ok(feed)
    }

    fn apply_rss_item_field(item: &mut FeedItem, name: &[u8], text: &str) {
        match name {
            b"title" => item.title = non_empty(text),
            b"description" => item.description = non_empty(text),
            b"link" => item.url = non_empty(text),
            b"author" => item.author = non_empty(text),
            b"dc:creator" if item.author.is_none() => item.author = non_empty(text),
            b"guid" => item.guid = non_empty(text),
            b"pubDate" => item.published = parse_rfc2822(text),
            _ => {}
        }
    }

    fn push_rss_enclosure(element: &BytesStart<'_>, item: Option<&mut FeedItem>) {
        let Some(item) = item else {
            return;
        };

        if let Some(url) = attr_value(element, "url").filter(|url| !url.is_empty()) {
            item.enclosures.push(Enclosure {
                url,
                mime_type: attr_value(element, "type"),
                length: attr_value(element, "length").and_then(|v| v.parse().ok()),
            });
        }
    }

    /// Parses an Atom feed
    fn parse_atom(content: &str) -> FeedResult<Feed> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut feed = Feed::new(FeedType::Atom, String::new());
        let mut current_item: Option<FeedItem> = None;
        let mut text_buffer = String::new();
        let mut in_author = false;

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    text_buffer.clear();
                    match e.name().as_ref() {
                        b"entry" => current_item = Some(FeedItem::default()),
                        b"author" => in_author = true,
                        b"link" => Self::apply_atom_link(&e, current_item.as_mut(), &mut feed),
                        _ => {}
                    }
                }
                Ok(Event::Empty(e)) => {
                    if e.name().as_ref() == b"link" {
                        Self::apply_atom_link(&e, current_item.as_mut(), &mut feed);
                    }
                }
                Ok(Event::Text(e)) => text_buffer.push_str(&Self::decode_text(&e)),
                Ok(Event::CData(e)) => text_buffer.push_str(&String::from_utf8_lossy(&e)),
                Ok(Event::End(e)) => {
                    let text = std::mem::take(&mut text_buffer);
                    let text = text.trim();
                    let name = e.name();
                    let name = name.as_ref();

                    if name == b"entry" {
                        if let Some(item) = current_item.take() {
                            feed.add_item(item);
                        }
                    } else if name == b"author" {
                        in_author = false;
                    } else if let Some(item) = current_item.as_mut() {
                        match name {
                            b"title" => item.title = non_empty(text),
                            b"summary" => item.description = non_empty(text),
                            b"content" if item.description.is_none() => {
                                item.description = non_empty(text)
                            }
                            b"name" if in_author => item.author = non_empty(text),
                            b"id" => item.guid = non_empty(text),
                            b"published" => item.published = parse_rfc3339(text),
                            b"updated" if item.published.is_none() => {
                                item.published = parse_rfc3339(text)
                            }
                            _ => {}
                        }
                    } else {
                        match name {
                            b"title" if feed.title.is_empty() => feed.title = text.to_string(),
                            b"subtitle" => feed.description = non_empty(text),
                            b"updated" => feed.updated = parse_rfc3339(text),
                            _ => {}
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(FeedError::from(e)),
                _ => {}
            }
            buf.clear();
        }

        if feed.title.is_empty() {
            return Err(FeedError::MissingField("title".to_string()));
        }

        Ok(feed)
    }

    /// Atom links: `rel="enclosure"` carries media, `rel="alternate"` (the
    /// default when `rel` is missing) is the human-facing page.
    fn apply_atom_link(element: &BytesStart<'_>, item: Option<&mut FeedItem>, feed: &mut Feed) {
        let Some(href) = attr_value(element, "href").filter(|href| !href.is_empty()) else {
            return;
        };
        let rel = attr_value(element, "rel").unwrap_or_else(|| "alternate".to_string());

        match (item, rel.as_str()) {
            (Some(item), "enclosure") => item.enclosures.push(Enclosure {
                url: href,
                mime_type: attr_value(element, "type"),
                length: attr_value(element, "length").and_then(|v| v.parse().ok()),
            }),
            (Some(item), "alternate") if item.url.is_none() => item.url = Some(href),
            (None, "alternate") if feed.url.is_none() => feed.url = Some(href),
            _ => {}
        }
    }

    fn decode_text(text: &BytesText<'_>) -> String {
        text.unescape()
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| String::from_utf8_lossy(text).into_owned())
    }
}

fn attr_value(element: &BytesStart<'_>, name: &str) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == name.as_bytes())
        .map(|attr| {
            attr.unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned())
        })
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn parse_rfc2822(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_rfc3339(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_rss() {
        let rss = r#"<?xml version="1.0"?><rss version="2.0"><channel></channel></rss>"#;
        assert_eq!(FeedParser::detect_type(rss), FeedType::Rss);
    }

    #[test]
    fn test_detect_atom() {
        let atom = r#"<?xml version="1.0"?><feed xmlns="http://www.w3.org/2005/Atom"></feed>"#;
        assert_eq!(FeedParser::detect_type(atom), FeedType::Atom);
    }

    #[test]
    fn test_parse_minimal_rss() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Test Feed</title>
    <description>A test feed</description>
    <link>http://example.com</link>
  </channel>
</rss>"#;

        let feed = FeedParser::parse(rss).expect("Should parse RSS");
        assert_eq!(feed.title, "Test Feed");
        assert_eq!(feed.description, Some("A test feed".to_string()));
        assert!(feed.is_empty());
    }

    #[test]
    fn test_parse_rss_with_items() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Test Feed</title>
    <item>
      <title>Episode 1</title>
      <guid isPermaLink="false">ep-1</guid>
      <enclosure url="http://example.com/ep1.mp3" type="audio/mpeg" length="1000"/>
    </item>
    <item>
      <title>Episode 2</title>
    </item>
  </channel>
</rss>"#;

        let feed = FeedParser::parse(rss).expect("Should parse RSS");
        assert_eq!(feed.item_count(), 2);
        assert_eq!(feed.items[0].title.as_deref(), Some("Episode 1"));
        assert_eq!(feed.items[0].guid.as_deref(), Some("ep-1"));
        assert!(feed.items[0].has_audio());
        assert!(feed.items[1].guid.is_none());
    }

    #[test]
    fn test_image_title_does_not_leak_into_channel() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <image>
      <title>Logo</title>
      <link>http://example.com/logo</link>
    </image>
    <title>Real Title</title>
    <link>http://example.com</link>
  </channel>
</rss>"#;

        let feed = FeedParser::parse(rss).expect("Should parse RSS");
        assert_eq!(feed.title, "Real Title");
        assert_eq!(feed.url.as_deref(), Some("http://example.com"));
    }

    #[test]
    fn test_blank_guid_is_absent() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Test Feed</title>
    <item><title>No id</title><guid>   </guid></item>
  </channel>
</rss>"#;

        let feed = FeedParser::parse(rss).expect("Should parse RSS");
        assert!(feed.items[0].guid.is_none());
    }

    #[test]
    fn test_parse_invalid_xml() {
        let invalid = "not xml at all";
        let result = FeedParser::parse(invalid);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(matches!(
            FeedParser::parse("   "),
            Err(FeedError::InvalidXml(_))
        ));
    }

    #[test]
    fn test_parse_rss_missing_title() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <description>No title</description>
  </channel>
</rss>"#;

        let result = FeedParser::parse(rss);
        assert!(matches!(result, Err(FeedError::MissingField(_))));
    }
}
