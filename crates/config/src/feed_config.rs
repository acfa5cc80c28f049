//! Source feed configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Where the podcast feed is polled from
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    /// RSS feed URL of the show, empty when not configured
    pub rss_url: String,
}

impl FeedConfig {
    /// Returns true if a feed URL is set
    pub fn is_configured(&self) -> bool {
        !self.rss_url.trim().is_empty()
    }
}

impl ConfigSection for FeedConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![Validator::optional_http_url(
            &self.rss_url,
            "feed.rss_url",
        )])
    }

    fn section_name(&self) -> &'static str {
        "feed"
    }
}
