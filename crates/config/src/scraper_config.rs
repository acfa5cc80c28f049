//! Companion channel page configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// CSS selector matching episode links on the channel page
pub const DEFAULT_EPISODE_SELECTOR: &str = "a.story-item-content";

/// How the channel page is loaded
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeMode {
    /// Render the page in headless Chrome and wait for the selector
    #[default]
    Browser,
    /// Single plain GET, for pages whose links are in the served HTML
    Static,
}

impl std::fmt::Display for ScrapeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScrapeMode::Browser => write!(f, "browser"),
            ScrapeMode::Static => write!(f, "static"),
        }
    }
}

impl FromStr for ScrapeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "browser" | "chrome" => Ok(ScrapeMode::Browser),
            "static" | "http" => Ok(ScrapeMode::Static),
            other => Err(format!("unknown scrape mode '{}'", other)),
        }
    }
}

/// Settings for finding the latest episode link on the companion channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScraperConfig {
    /// Channel page URL, empty when not configured
    pub channel_url: String,

    /// CSS selector whose first match is the newest episode link
    pub episode_selector: String,

    /// Page load timeout in seconds. In browser mode this is also how long
    /// to wait for the selector to appear.
    pub timeout_secs: u64,

    pub mode: ScrapeMode,

    /// Chrome binary to launch in browser mode. Detected when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_executable: Option<PathBuf>,
}

impl ScraperConfig {
    /// Returns true if a channel page URL is set
    pub fn is_configured(&self) -> bool {
        !self.channel_url.trim().is_empty()
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            channel_url: String::new(),
            episode_selector: DEFAULT_EPISODE_SELECTOR.to_string(),
            timeout_secs: 60,
            mode: ScrapeMode::default(),
            chrome_executable: None,
        }
    }
}

impl ConfigSection for ScraperConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let chrome = match &self.chrome_executable {
            Some(path) if path.as_os_str().is_empty() => Err(ValidationError::new(
                "scraper.chrome_executable",
                "must not be empty when set",
            )),
            _ => Ok(()),
        };

        Validator::collect_errors(vec![
            Validator::optional_http_url(&self.channel_url, "scraper.channel_url"),
            Validator::not_empty(&self.episode_selector, "scraper.episode_selector"),
            Validator::in_range(self.timeout_secs, 1, 600, "scraper.timeout_secs"),
            chrome,
        ])
    }

    fn section_name(&self) -> &'static str {
        "scraper"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ScraperConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.episode_selector, DEFAULT_EPISODE_SELECTOR);
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.mode, ScrapeMode::Browser);
    }

    #[test]
    fn test_collects_all_errors() {
        let config = ScraperConfig {
            channel_url: "voicy.jp/channel/1".to_string(),
            episode_selector: " ".to_string(),
            timeout_secs: 0,
            chrome_executable: Some(PathBuf::new()),
            ..ScraperConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().len(), 4);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("Static".parse::<ScrapeMode>(), Ok(ScrapeMode::Static));
        assert_eq!("chrome".parse::<ScrapeMode>(), Ok(ScrapeMode::Browser));
        assert!("curl".parse::<ScrapeMode>().is_err());
    }

    #[test]
    fn test_mode_from_toml() {
        let config: ScraperConfig = toml::from_str(
            r#"
            mode = "static"
            chrome_executable = "/usr/bin/chromium"
            "#,
        )
        .unwrap();
        assert_eq!(config.mode, ScrapeMode::Static);
        assert_eq!(config.chrome_executable, Some(PathBuf::from("/usr/bin/chromium")));
    }
}
