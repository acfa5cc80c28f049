// crates/network/src/browser.rs
//! Latest-episode lookup through headless Chrome
//!
//! Channel pages that build their episode list in JavaScript serve no links
//! in the initial HTML. [`BrowserScraper`] loads the page in Chrome and polls
//! the rendered DOM until the selector matches or the timeout runs out.

use crate::client::parse_url;
use crate::episode_page::{extract_episode_link, parse_selector};
use crate::error::{NetworkError, NetworkResult};
use crate::traits::EpisodeLinkScraper;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

fn browser_error(err: impl std::fmt::Display) -> NetworkError {
    NetworkError::Browser(err.to_string())
}

/// Calls `load` until the rendered page has an episode link or `timeout`
/// has passed since the first call
async fn wait_for_link<F, Fut>(
    mut load: F,
    page_url: &str,
    selector: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> NetworkResult<Option<String>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = NetworkResult<String>>,
{
    let deadline = Instant::now() + timeout;

    loop {
        let html = load().await?;
        if let Some(link) = extract_episode_link(&html, page_url, selector)? {
            return Ok(Some(link));
        }

        if Instant::now() + poll_interval > deadline {
            log::debug!("'{}' did not appear within {:?}", selector, timeout);
            return Ok(None);
        }
        tokio::time::sleep(poll_interval).await;
    }
}

/// Scrapes a channel page for its newest episode link in headless Chrome
#[derive(Debug, Clone)]
pub struct BrowserScraper {
    channel_url: String,
    selector: String,
    timeout: Duration,
    poll_interval: Duration,
    chrome_executable: Option<PathBuf>,
}

impl BrowserScraper {
    /// Creates a scraper, rejecting selectors that do not parse
    ///
    /// `timeout` bounds both the page load and the wait for the selector.
    pub fn new(
        channel_url: impl Into<String>,
        selector: impl Into<String>,
        timeout: Duration,
    ) -> NetworkResult<Self> {
        let selector = selector.into();
        parse_selector(&selector)?;

        Ok(Self {
            channel_url: channel_url.into(),
            selector,
            timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
            chrome_executable: None,
        })
    }

    /// Launches this Chrome binary instead of searching for one
    pub fn with_chrome_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_executable = Some(path.into());
        self
    }

    /// Sets how often the rendered page is re-checked
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Returns the channel page URL
    pub fn channel_url(&self) -> &str {
        &self.channel_url
    }

    fn browser_config(&self) -> NetworkResult<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .request_timeout(self.timeout);

        if let Some(path) = &self.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(browser_error)
    }

    /// Renders the channel page and extracts the newest episode link
    ///
    /// A fresh browser is launched for every call and closed before
    /// returning.
    pub async fn latest_link(&self) -> NetworkResult<Option<String>> {
        if self.channel_url.trim().is_empty() {
            return Err(NetworkError::MissingInput("channel URL"));
        }
        parse_url(&self.channel_url)?;

        log::info!("Rendering {} in headless Chrome", self.channel_url);
        let (mut browser, mut handler) = Browser::launch(self.browser_config()?)
            .await
            .map_err(browser_error)?;

        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let result = self.scrape_with(&browser).await;

        if let Err(e) = browser.close().await {
            log::debug!("Closing browser failed: {}", e);
        }
        if let Err(e) = browser.wait().await {
            log::debug!("Waiting for browser exit failed: {}", e);
        }
        events.abort();

        match &result {
            Ok(Some(url)) => log::info!("Latest episode link: {}", url),
            Ok(None) => log::warn!(
                "No episode link matching '{}' on {} after {:?}",
                self.selector,
                self.channel_url,
                self.timeout
            ),
            Err(_) => {}
        }
        result
    }

    async fn scrape_with(&self, browser: &Browser) -> NetworkResult<Option<String>> {
        let page = browser
            .new_page(self.channel_url.as_str())
            .await
            .map_err(browser_error)?;

        let page = &page;
        wait_for_link(
            || async move { page.content().await.map_err(browser_error) },
            &self.channel_url,
            &self.selector,
            self.timeout,
            self.poll_interval,
        )
        .await
    }
}

#[async_trait]
impl EpisodeLinkScraper for BrowserScraper {
    async fn latest_episode_link(&self) -> NetworkResult<Option<String>> {
        self.latest_link().await
    }
}
