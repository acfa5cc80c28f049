// crates/feed-parser/src/feed.rs
//! Feed data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Type of feed format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedType {
    /// RSS 2.0 (or RDF-flavoured RSS 1.0) feed
    Rss,
    /// Atom feed
    Atom,
    /// Unknown or unsupported format
    Unknown,
}

/// A parsed feed with metadata and items
///
/// Items keep the order in which the document declares them. Podcast hosts
/// publish newest-first, and downstream change detection relies on that
/// order, so nothing in this crate re-sorts them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed {
    /// Type of feed
    pub feed_type: FeedType,
    /// Feed title
    pub title: String,
    /// Feed description
    pub description: Option<String>,
    /// Feed URL
    pub url: Option<String>,
    /// Feed language
    pub language: Option<String>,
    /// Last update time
    pub updated: Option<DateTime<Utc>>,
    /// Feed items/episodes
    pub items: Vec<FeedItem>,
}

impl Feed {
    /// Creates a new feed
    pub fn new(feed_type: FeedType, title: String) -> Self {
        Self {
            feed_type,
            title,
            description: None,
            url: None,
            language: None,
            updated: None,
            items: Vec::new(),
        }
    }

    /// Returns the number of items in the feed
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the feed has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds an item to the feed
    pub fn add_item(&mut self, item: FeedItem) {
        self.items.push(item);
    }

    /// Filters items to only those with audio enclosures
    pub fn audio_items(&self) -> Vec<&FeedItem> {
        self.items.iter().filter(|item| item.has_audio()).collect()
    }
}

/// A single item in a feed (episode, article, etc.)
///
/// Every field is optional here. Deciding what a missing field means is the
/// job of the consumer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Item title
    pub title: Option<String>,
    /// Item description/summary
    pub description: Option<String>,
    /// Item URL/link
    pub url: Option<String>,
    /// Publication date, absent when missing or unparseable
    pub published: Option<DateTime<Utc>>,
    /// Author/creator
    pub author: Option<String>,
    /// Unique identifier (RSS `guid`, Atom `id`)
    pub guid: Option<String>,
    /// Media enclosures in declaration order
    pub enclosures: Vec<Enclosure>,
}

impl FeedItem {
    /// Creates a new feed item with a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Sets the unique identifier
    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(guid.into());
        self
    }

    /// Appends an enclosure
    pub fn with_enclosure(mut self, enclosure: Enclosure) -> Self {
        self.enclosures.push(enclosure);
        self
    }

    /// Returns the first enclosure with an `audio/*` media type
    pub fn first_audio_enclosure(&self) -> Option<&Enclosure> {
        self.enclosures.iter().find(|e| e.is_audio())
    }

    /// Returns true if this item has an audio enclosure
    pub fn has_audio(&self) -> bool {
        self.first_audio_enclosure().is_some()
    }

    /// Returns the URL of the first audio enclosure if available
    pub fn audio_url(&self) -> Option<&str> {
        self.first_audio_enclosure().map(|e| e.url.as_str())
    }
}

/// Media enclosure (typically audio or video)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enclosure {
    /// URL to the media file
    pub url: String,
    /// MIME type (e.g., "audio/mpeg")
    pub mime_type: Option<String>,
    /// File size in bytes
    pub length: Option<u64>,
}

impl Enclosure {
    /// Creates a new enclosure
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mime_type: None,
            length: None,
        }
    }

    /// Sets the declared media type
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Returns true if this is an audio enclosure
    pub fn is_audio(&self) -> bool {
        self.mime_type
            .as_ref()
            .is_some_and(|mime| mime.starts_with("audio/"))
    }

    /// Returns true if this is a video enclosure
    pub fn is_video(&self) -> bool {
        self.mime_type
            .as_ref()
            .is_some_and(|mime| mime.starts_with("video/"))
    }
}
