// crates/network/src/feed_fetcher.rs
//! Podcast feed download

use crate::client::Client;
use crate::error::{NetworkError, NetworkResult};
use crate::traits::FeedSource;
use async_trait::async_trait;
use castrelay_feed_parser::{Feed, FeedParser};

/// Downloads and parses one feed URL
#[derive(Clone)]
pub struct FeedFetcher {
    client: Client,
    url: String,
}

impl FeedFetcher {
    /// Creates a fetcher for `url`
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Returns the feed URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches the feed and parses it
    pub async fn fetch(&self) -> NetworkResult<Feed> {
        if self.url.trim().is_empty() {
            return Err(NetworkError::MissingInput("feed URL"));
        }

        log::info!("Fetching feed {}", self.url);
        let body = self.client.get_text(&self.url).await?;
        let feed = FeedParser::parse(&body)?;
        log::info!("Feed '{}' has {} entries", feed.title, feed.item_count());
        Ok(feed)
    }
}

#[async_trait]
impl FeedSource for FeedFetcher {
    async fn fetch_feed(&self) -> NetworkResult<Feed> {
        self.fetch().await
    }
}
