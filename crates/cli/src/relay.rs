// FILE: crates/cli/src/relay.rs
//! One relay run: feed -> new episodes -> companion link -> webhook -> marker

use anyhow::{Context, Result};
use castrelay_diff_engine::{Episode, EpisodeDiffEngine, FeedEntry, Marker, MarkerStore};
use castrelay_network::{EpisodeLinkScraper, FeedSource, WebhookSink};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Switches for a single run
#[derive(Debug, Clone, Copy, Default)]
pub struct RelayOptions {
    /// Detect only; no scrape, webhook or marker write
    pub dry_run: bool,
    /// Hold the marker back unless the webhook delivery succeeded
    pub require_delivery: bool,
}

/// What happened to the newest episode link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// The webhook accepted the link
    Delivered { episode_url: String },
    /// The channel page had no matching link
    NoLinkFound,
    /// Scraping or delivery failed
    Failed { reason: String },
    /// A collaborator is not configured
    Skipped {
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        episode_url: Option<String>,
    },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }
}

/// Result of one run, printed by `check --json`
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub checked_at: DateTime<Utc>,
    pub feed_title: String,
    pub entries_scanned: usize,
    pub previous_marker: Option<Marker>,
    pub new_episodes: Vec<Episode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<DeliveryOutcome>,
    pub next_marker: Option<Marker>,
    pub marker_saved: bool,
    pub marker_deferred: bool,
    pub dry_run: bool,
}

impl RunReport {
    pub fn has_new_episodes(&self) -> bool {
        !self.new_episodes.is_empty()
    }
}

/// Wires the feed, the diff engine and the downstream collaborators together
pub struct Relay<S> {
    feed: Arc<dyn FeedSource>,
    scraper: Option<Arc<dyn EpisodeLinkScraper>>,
    sink: Option<Arc<dyn WebhookSink>>,
    engine: EpisodeDiffEngine<S>,
}

impl<S: MarkerStore> Relay<S> {
    pub fn new(feed: Arc<dyn FeedSource>, engine: EpisodeDiffEngine<S>) -> Self {
        Self {
            feed,
            scraper: None,
            sink: None,
            engine,
        }
    }

    pub fn with_scraper(mut self, scraper: Arc<dyn EpisodeLinkScraper>) -> Self {
        self.scraper = Some(scraper);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn WebhookSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn engine(&self) -> &EpisodeDiffEngine<S> {
        &self.engine
    }

    /// Runs once
    ///
    /// A feed failure aborts the run before the marker is read. Scrape and
    /// webhook failures are recorded in the report; whether the marker still
    /// advances depends on `require_delivery`.
    pub async fn run(&self, options: RelayOptions) -> Result<RunReport> {
        let feed = self
            .feed
            .fetch_feed()
            .await
            .context("Failed to fetch the source feed")?;

        let entries: Vec<FeedEntry> = feed.items.iter().map(FeedEntry::from).collect();
        let outcome = self.engine.detect(&entries);

        let mut report = RunReport {
            checked_at: Utc::now(),
            feed_title: feed.title.clone(),
            entries_scanned: entries.len(),
            previous_marker: outcome.previous_marker.clone(),
            new_episodes: outcome.new_episodes.clone(),
            delivery: None,
            next_marker: outcome.next_marker.clone(),
            marker_saved: false,
            marker_deferred: false,
            dry_run: options.dry_run,
        };

        if !outcome.has_new_episodes() {
            log::info!("No new episodes");
            return Ok(report);
        }

        for episode in &outcome.new_episodes {
            log::info!("New episode: {} ({})", episode.title, episode.guid);
        }

        if options.dry_run {
            log::info!("Dry run, skipping delivery and marker update");
            return Ok(report);
        }

        let delivery = self.deliver_latest().await;

        if options.require_delivery && !delivery.is_delivered() {
            log::warn!("Delivery did not succeed, marker left unchanged for the next run");
            report.marker_deferred = true;
        } else {
            report.marker_saved = self
                .engine
                .commit(&outcome)
                .context("Failed to save the last-processed marker")?;
        }

        report.delivery = Some(delivery);
        Ok(report)
    }

    /// Looks up the newest companion link once and forwards it once
    async fn deliver_latest(&self) -> DeliveryOutcome {
        let Some(scraper) = &self.scraper else {
            log::warn!("No channel page configured, nothing to deliver");
            return DeliveryOutcome::Skipped {
                reason: "no channel page configured".to_string(),
                episode_url: None,
            };
        };

        let link = match scraper.latest_episode_link().await {
            Ok(Some(link)) => link,
            Ok(None) => return DeliveryOutcome::NoLinkFound,
            Err(e) => {
                log::error!("Scraping the channel page failed: {}", e);
                return DeliveryOutcome::Failed {
                    reason: format!("scrape failed: {}", e),
                };
            }
        };

        let Some(sink) = &self.sink else {
            log::warn!("No webhook configured, not forwarding {}", link);
            return DeliveryOutcome::Skipped {
                reason: "no webhook configured".to_string(),
                episode_url: Some(link),
            };
        };

        match sink.deliver(&link).await {
            Ok(()) => DeliveryOutcome::Delivered { episode_url: link },
            Err(e) => {
                log::error!("Webhook delivery failed: {}", e);
                DeliveryOutcome::Failed {
                    reason: format!("webhook failed: {}", e),
                }
            }
        }
    }
}
