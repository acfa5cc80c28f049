// crates/feed-parser/src/lib.rs
//! RSS and Atom feed parser for podcast feeds
//!
//! This crate turns a feed document into a [`Feed`] whose items keep the
//! document order. It handles:
//! - RSS 2.0 feeds (and RDF-style RSS 1.0 item lists)
//! - Atom feeds
//! - Multiple enclosures per item, in declaration order
//! - CDATA-wrapped text, as emitted by most podcast hosts
//!
//! Missing or malformed per-item fields never fail a parse; they come back as
//! `None`. Only a broken document or a feed without a title is an error.
//!
//! # Example
//!
//! ```rust
//! use castrelay_feed_parser::FeedParser;
//!
//! let rss = r#"<?xml version="1.0"?>
//! <rss version="2.0">
//!   <channel>
//!     <title>My Podcast</title>
//!     <item>
//!       <title>Episode 1</title>
//!       <guid>ep-1</guid>
//!       <enclosure url="http://example.com/ep1.mp3" type="audio/mpeg"/>
//!     </item>
//!   </channel>
//! </rss>"#;
//!
//! let feed = FeedParser::parse(rss).expect("Failed to parse feed");
//! println!("Feed: {} with {} episodes", feed.title, feed.item_count());
//! ```

mod error;
mod feed;
mod parser;

pub use error::{FeedError, FeedResult};
pub use feed::{Enclosure, Feed, FeedItem, FeedType};
pub use parser::FeedParser;
