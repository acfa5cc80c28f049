//! Webhook delivery configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Where discovered episode links are delivered
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WebhookConfig {
    /// Webhook URL, empty when not configured
    pub url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl WebhookConfig {
    /// Returns true if a webhook URL is set
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: 30,
        }
    }
}

impl ConfigSection for WebhookConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::optional_http_url(&self.url, "webhook.url"),
            Validator::in_range(self.timeout_secs, 1, 300, "webhook.timeout_secs"),
        ])
    }

    fn section_name(&self) -> &'static str {
        "webhook"
    }
}
