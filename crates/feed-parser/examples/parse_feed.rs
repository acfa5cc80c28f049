// crates/feed-parser/examples/parse_feed.rs
//! Parses a feed file (or a built-in sample) and prints its items.
//!
//! ```text
//! cargo run -p castrelay-feed-parser --example parse_feed -- path/to/feed.xml
//! ```

use castrelay_feed_parser::FeedParser;

const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Sample Voice Channel</title>
    <link>https://stand.fm/channels/sample</link>
    <item>
      <title>Episode 2</title>
      <guid>sample-2</guid>
      <link>https://stand.fm/episodes/sample-2</link>
      <pubDate>Tue, 02 Jan 2024 07:00:00 +0900</pubDate>
      <enclosure url="https://cdn.example.com/sample-2.m4a" type="audio/x-m4a" length="15000000"/>
    </item>
    <item>
      <title>Episode 1</title>
      <guid>sample-1</guid>
      <pubDate>not a date</pubDate>
    </item>
  </channel>
</rss>"#;

fn main() {
    let content = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Failed to read {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => SAMPLE.to_string(),
    };

    match FeedParser::parse(&content) {
        Ok(feed) => {
            println!("Feed: {} ({:?})", feed.title, feed.feed_type);
            if let Some(url) = &feed.url {
                println!("URL: {}", url);
            }
            println!("{}", "-".repeat(60));

            for (i, item) in feed.items.iter().enumerate() {
                println!("{}. {}", i + 1, item.title.as_deref().unwrap_or("(untitled)"));
                println!("   GUID: {}", item.guid.as_deref().unwrap_or("(none)"));
                match &item.published {
                    Some(published) => println!("   Published: {}", published.to_rfc3339()),
                    None => println!("   Published: (unknown)"),
                }
                if let Some(audio) = item.audio_url() {
                    println!("   Audio: {}", audio);
                }
            }
        }
        Err(e) => {
            eprintln!("Error parsing feed: {}", e);
            std::process::exit(1);
        }
    }
}
