// crates/network/src/webhook.rs
//! Webhook delivery of discovered episode links

use crate::client::Client;
use crate::error::{NetworkError, NetworkResult};
use crate::traits::WebhookSink;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp layout used in the payload
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// JSON body posted to the webhook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub voicy_episode_url: String,
    pub timestamp: String,
}

impl WebhookPayload {
    /// Builds a payload stamped with `at`
    pub fn new(episode_url: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            voicy_episode_url: episode_url.into(),
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Posts episode links to a webhook URL
#[derive(Clone)]
pub struct WebhookSender {
    client: Client,
    url: String,
}

impl WebhookSender {
    /// Creates a sender for `url`
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Returns the webhook URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends one payload for `episode_url`
    ///
    /// Empty inputs are rejected before any request is made.
    pub async fn send(&self, episode_url: &str) -> NetworkResult<()> {
        if self.url.trim().is_empty() {
            return Err(NetworkError::MissingInput("webhook URL"));
        }
        if episode_url.trim().is_empty() {
            return Err(NetworkError::MissingInput("episode URL"));
        }

        let payload = WebhookPayload::new(episode_url.trim(), Utc::now());
        let response = self.client.post_json(&self.url, &payload).await?;
        log::info!(
            "Webhook accepted {} (HTTP {})",
            payload.voicy_episode_url,
            response.status().as_u16()
        );
        Ok(())
    }
}

#[async_trait]
impl WebhookSink for WebhookSender {
    async fn deliver(&self, episode_url: &str) -> NetworkResult<()> {
        self.send(episode_url).await
    }
}
