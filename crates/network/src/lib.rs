// crates/network/src/lib.rs
//! HTTP collaborators of the relay
//!
//! - [`FeedFetcher`] downloads and parses the source feed
//! - [`EpisodePageScraper`] finds the newest episode link on the companion
//!   channel page
//! - [`BrowserScraper`] does the same in headless Chrome for pages that
//!   render their episode list with JavaScript (`browser` feature)
//! - [`WebhookSender`] posts that link to a webhook
//!
//! Each one implements a trait from this crate so the relay run can be
//! exercised with in-memory fakes. Requests are made once; there are no
//! retries.

#[cfg(feature = "browser")]
mod browser;
mod client;
mod episode_page;
mod error;
mod feed_fetcher;
mod traits;
mod webhook;

#[cfg(feature = "browser")]
pub use browser::BrowserScraper;
pub use client::{Client, ClientConfig};
pub use episode_page::{extract_episode_link, EpisodePageScraper};
pub use error::{NetworkError, NetworkResult};
pub use feed_fetcher::FeedFetcher;
pub use traits::{EpisodeLinkScraper, FeedSource, WebhookSink};
pub use webhook::{WebhookPayload, WebhookSender, TIMESTAMP_FORMAT};
