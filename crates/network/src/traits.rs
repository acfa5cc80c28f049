// crates/network/src/traits.rs
//! Seams between the relay run and the outside world

use crate::error::NetworkResult;
use async_trait::async_trait;
use castrelay_feed_parser::Feed;

/// Something that yields the current state of the source feed
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetches and parses the feed
    async fn fetch_feed(&self) -> NetworkResult<Feed>;
}

/// Something that can find the newest episode link on the companion site
#[async_trait]
pub trait EpisodeLinkScraper: Send + Sync {
    /// Returns the newest episode link, `None` when the page has none
    async fn latest_episode_link(&self) -> NetworkResult<Option<String>>;
}

/// Something that accepts discovered episode links
#[async_trait]
pub trait WebhookSink: Send + Sync {
    /// Delivers one episode link
    async fn deliver(&self, episode_url: &str) -> NetworkResult<()>;
}
