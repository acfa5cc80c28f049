// crates/feed-parser/tests/integration_tests.rs
//! Integration tests for feed parser

use castrelay_feed_parser::{FeedParser, FeedType};

#[test]
fn test_parse_podcast_rss_feed() {
    let rss = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:itunes="http://www.itunes.com/dtds/podcast-1.0.dtd">
  <channel>
    <title>The Morning Voice</title>
    <description>Short talks every morning</description>
    <link>https://stand.fm/channels/morning</link>
    <language>ja</language>
    <itunes:author>Host</itunes:author>

    <item>
      <title>Episode 2: Coffee</title>
      <description>On coffee</description>
      <link>https://stand.fm/episodes/2</link>
      <guid isPermaLink="false">episode-2</guid>
      <pubDate>Tue, 02 Jan 2024 07:00:00 +0900</pubDate>
      <enclosure url="https://cdn.example.com/2.m4a" type="audio/x-m4a" length="10000000"/>
      <itunes:title>Coffee</itunes:title>
    </item>

    <item>
      <title>Episode 1: Hello</title>
      <guid isPermaLink="false">episode-1</guid>
      <pubDate>Mon, 01 Jan 2024 07:00:00 +0900</pubDate>
      <enclosure url="https://cdn.example.com/1.m4a" type="audio/x-m4a" length="9500000"/>
    </item>
  </channel>
</rss>"#;

    let feed = FeedParser::parse(rss).expect("Should parse podcast RSS");

    assert_eq!(feed.feed_type, FeedType::Rss);
    assert_eq!(feed.title, "The Morning Voice");
    assert_eq!(
        feed.description,
        Some("Short talks every morning".to_string())
    );
    assert_eq!(
        feed.url,
        Some("https://stand.fm/channels/morning".to_string())
    );
    assert_eq!(feed.language, Some("ja".to_string()));
    assert_eq!(feed.item_count(), 2);

    // Check first item
    let item1 = &feed.items[0];
    assert_eq!(item1.title.as_deref(), Some("Episode 2: Coffee"));
    assert_eq!(item1.url, Some("https://stand.fm/episodes/2".to_string()));
    assert_eq!(item1.guid, Some("episode-2".to_string()));
    let published = item1.published.expect("Should have a publish date");
    assert_eq!(published.to_rfc3339(), "2024-01-01T22:00:00+00:00");

    // Check enclosure
    let enclosure = item1.first_audio_enclosure().expect("Should have enclosure");
    assert_eq!(enclosure.url, "https://cdn.example.com/2.m4a");
    assert_eq!(enclosure.mime_type, Some("audio/x-m4a".to_string()));
    assert_eq!(enclosure.length, Some(10000000));
}

#[test]
fn test_items_keep_document_order() {
    let rss = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Test</title>
    <item>
      <title>Older</title>
      <guid>a</guid>
      <pubDate>Mon, 01 Jan 2024 00:00:00 +0000</pubDate>
    </item>
    <item>
      <title>Newer</title>
      <guid>b</guid>
      <pubDate>Tue, 02 Jan 2024 00:00:00 +0000</pubDate>
    </item>
  </channel>
</rss>"#;

    let feed = FeedParser::parse(rss).expect("Should parse");

    let guids: Vec<_> = feed.items.iter().filter_map(|i| i.guid.as_deref()).collect();
    assert_eq!(guids, vec!["a", "b"]);
}

#[test]
fn test_parse_atom_feed() {
    let atom = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Podcast</title>
  <subtitle>Episodes in Atom format</subtitle>
  <link href="https://example.com/atom"/>
  <updated>2024-01-02T12:00:00Z</updated>

  <entry>
    <title>Part 2</title>
    <link href="https://example.com/part2"/>
    <link rel="enclosure" href="https://example.com/part2.mp3" type="audio/mpeg" length="42"/>
    <id>urn:uuid:1235</id>
    <updated>2024-01-02T12:00:00Z</updated>
    <author><name>Narrator</name></author>
  </entry>

  <entry>
    <title>Part 1</title>
    <link rel="alternate" href="https://example.com/part1"/>
    <id>urn:uuid:1234</id>
    <published>2024-01-01T12:00:00Z</published>
    <summary>The beginning</summary>
  </entry>
</feed>"#;

    let feed = FeedParser::parse(atom).expect("Should parse Atom");

    assert_eq!(feed.feed_type, FeedType::Atom);
    assert_eq!(feed.title, "Atom Podcast");
    assert_eq!(
        feed.description,
        Some("Episodes in Atom format".to_string())
    );
    assert_eq!(feed.url, Some("https://example.com/atom".to_string()));
    assert!(feed.updated.is_some());
    assert_eq!(feed.item_count(), 2);

    let item1 = &feed.items[0];
    assert_eq!(item1.title.as_deref(), Some("Part 2"));
    assert_eq!(item1.url, Some("https://example.com/part2".to_string()));
    assert_eq!(item1.guid, Some("urn:uuid:1235".to_string()));
    assert_eq!(item1.author, Some("Narrator".to_string()));
    assert_eq!(item1.audio_url(), Some("https://example.com/part2.mp3"));
    assert!(item1.published.is_some());

    let item2 = &feed.items[1];
    assert_eq!(item2.description, Some("The beginning".to_string()));
    assert!(!item2.has_audio());
}

#[test]
fn test_multiple_audio_formats() {
    let rss = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Multi-Format Feed</title>
    <item>
      <title>MP3 Episode</title>
      <enclosure url="https://example.com/ep1.mp3" type="audio/mpeg"/>
    </item>
    <item>
      <title>OGG Episode</title>
      <enclosure url="https://example.com/ep2.ogg" type="audio/ogg"/>
    </item>
    <item>
      <title>M4A Episode</title>
      <enclosure url="https://example.com/ep3.m4a" type="audio/mp4"/>
    </item>
    <item>
      <title>Video Episode</title>
      <enclosure url="https://example.com/ep4.mp4" type="video/mp4"/>
    </item>
  </channel>
</rss>"#;

    let feed = FeedParser::parse(rss).expect("Should parse");

    assert!(feed.items[0].has_audio());
    assert!(feed.items[1].has_audio());
    assert!(feed.items[2].has_audio());
    assert!(!feed.items[3].has_audio()); // Video, not audio

    let audio_items = feed.audio_items();
    assert_eq!(audio_items.len(), 3);
}

#[test]
fn test_empty_feed() {
    let rss = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Empty Feed</title>
    <description>No items</description>
  </channel>
</rss>"#;

    let feed = FeedParser::parse(rss).expect("Should parse empty feed");
    assert!(feed.is_empty());
    assert_eq!(feed.item_count(), 0);
}

#[test]
fn test_malformed_xml() {
    let bad_xml = "<rss><channel><title>Unclosed</channel></rss>";
    let result = FeedParser::parse(bad_xml);
    assert!(result.is_err());
}

#[test]
fn test_unknown_format() {
    let html = "<html><body>Not a feed</body></html>";
    let result = FeedParser::parse(html);
    assert!(result.is_err());
}

#[test]
fn test_feed_with_special_characters() {
    let rss = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Feed with &amp; Special &lt;Characters&gt;</title>
    <item>
      <title>Episode with "Quotes" &amp; Symbols</title>
      <description>Testing &lt;html&gt; entities</description>
    </item>
  </channel>
</rss>"#;

    let feed = FeedParser::parse(rss).expect("Should handle special chars");

    assert_eq!(feed.title, "Feed with & Special <Characters>");
    assert_eq!(
        feed.items[0].title.as_deref(),
        Some("Episode with \"Quotes\" & Symbols")
    );
}

#[test]
fn test_large_feed() {
    let mut rss = String::from(
        r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>Large Feed</title>"#,
    );

    for i in (0..1000).rev() {
        rss.push_str(&format!(
            r#"
    <item>
      <title>Episode {}</title>
      <guid>ep-{}</guid>
      <enclosure url="https://example.com/ep{}.mp3" type="audio/mpeg"/>
    </item>"#,
            i, i, i
        ));
    }

    rss.push_str(
        r#"
  </channel>
</rss>"#,
    );

    let feed = FeedParser::parse(&rss).expect("Should parse large feed");

    assert_eq!(feed.item_count(), 1000);
    assert_eq!(feed.items[0].guid.as_deref(), Some("ep-999"));
    assert_eq!(feed.items[999].guid.as_deref(), Some("ep-0"));
}
