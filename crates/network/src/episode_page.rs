// crates/network/src/episode_page.rs
//! Latest-episode lookup on the companion channel page
//!
//! The channel page lists episodes newest first. The first element matching
//! the configured selector is taken as the newest episode and its `href` is
//! returned as an absolute URL.

use crate::client::{parse_url, Client};
use crate::error::{NetworkError, NetworkResult};
use crate::traits::EpisodeLinkScraper;
use async_trait::async_trait;
use scraper::{Html, Selector};

pub(crate) fn parse_selector(selector: &str) -> NetworkResult<Selector> {
    Selector::parse(selector).map_err(|e| NetworkError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Finds the first element matching `selector` in `html` and resolves its
/// `href` against `page_url`
///
/// Returns `Ok(None)` when nothing matches or the first match has no usable
/// `href`.
pub fn extract_episode_link(
    html: &str,
    page_url: &str,
    selector: &str,
) -> NetworkResult<Option<String>> {
    let css = parse_selector(selector)?;
    let base = parse_url(page_url)?;
    let document = Html::parse_document(html);

    let Some(element) = document.select(&css).next() else {
        log::debug!("No element matches '{}'", selector);
        return Ok(None);
    };

    let href = match element.value().attr("href").map(str::trim) {
        Some(href) if !href.is_empty() => href,
        _ => {
            log::debug!("First matching element has no href");
            return Ok(None);
        }
    };

    let resolved = base
        .join(href)
        .map_err(|e| NetworkError::InvalidUrl(format!("{}: {}", href, e)))?;
    Ok(Some(resolved.to_string()))
}

/// Scrapes a channel page for its newest episode link
#[derive(Clone)]
pub struct EpisodePageScraper {
    client: Client,
    channel_url: String,
    selector: String,
}

impl EpisodePageScraper {
    /// Creates a scraper, rejecting selectors that do not parse
    pub fn new(
        client: Client,
        channel_url: impl Into<String>,
        selector: impl Into<String>,
    ) -> NetworkResult<Self> {
        let selector = selector.into();
        parse_selector(&selector)?;

        Ok(Self {
            client,
            channel_url: channel_url.into(),
            selector,
        })
    }

    /// Returns the channel page URL
    pub fn channel_url(&self) -> &str {
        &self.channel_url
    }

    /// Fetches the channel page and extracts the newest episode link
    pub async fn latest_link(&self) -> NetworkResult<Option<String>> {
        if self.channel_url.trim().is_empty() {
            return Err(NetworkError::MissingInput("channel URL"));
        }

        log::info!("Scraping {}", self.channel_url);
        let html = self.client.get_text(&self.channel_url).await?;
        let link = extract_episode_link(&html, &self.channel_url, &self.selector)?;

        match &link {
            Some(url) => log::info!("Latest episode link: {}", url),
            None => log::warn!(
                "No episode link matching '{}' on {}",
                self.selector,
                self.channel_url
            ),
        }
        Ok(link)
    }
}

#[async_trait]
impl EpisodeLinkScraper for EpisodePageScraper {
    async fn latest_episode_link(&self) -> NetworkResult<Option<String>> {
        self.latest_link().await
    }
}
