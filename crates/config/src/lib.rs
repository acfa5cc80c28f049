//! castrelay configuration
//!
//! One TOML file holds every setting the relay needs. Each section is a type
//! implementing [`ConfigSection`], so it validates itself and reports its
//! errors under its own name.
//!
//! - **Atomic writes**: config files are never left half-written
//! - **Graceful loading**: invalid values are reported as warnings on load
//!   and refused on save
//! - **Environment overrides**: deployment-specific URLs can come from the
//!   environment instead of the file
//!
//! # Example
//!
//! ```rust
//! use castrelay_config::{Config, ConfigManager};
//!
//! let dir = tempfile::tempdir().expect("temp dir");
//! let manager = ConfigManager::with_directory(dir.path().to_path_buf()).expect("manager");
//! let config = manager.load().unwrap_or_else(|e| {
//!     eprintln!("Config error: {}, using defaults", e);
//!     Config::default()
//! });
//!
//! assert_eq!(config.scraper.episode_selector, "a.story-item-content");
//! ```

mod error;
mod manager;
mod persistence;
mod validation;

// Config sections
pub mod app_config;
mod feed_config;
mod scraper_config;
mod state_config;
mod webhook_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::{apply_env_overrides, ConfigManager, EnvOverride, LoadedConfig, ENV_OVERRIDES};
pub use validation::{ConfigSection, Validator};

pub use app_config::{AppConfig, LogLevel};
pub use feed_config::FeedConfig;
pub use scraper_config::{ScrapeMode, ScraperConfig, DEFAULT_EPISODE_SELECTOR};
pub use state_config::{default_marker_path, StateConfig, MARKER_FILE_NAME};
pub use webhook_config::WebhookConfig;

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Application-level settings
    pub app: AppConfig,

    /// Source podcast feed
    pub feed: FeedConfig,

    /// Companion channel page
    pub scraper: ScraperConfig,

    /// Webhook delivery
    pub webhook: WebhookConfig,

    /// Marker persistence
    pub state: StateConfig,
}

impl Config {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the entire configuration
    ///
    /// Returns all validation errors found across all sections.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(mut e) = self.app.validate() {
            errors.append(&mut e);
        }
        if let Err(mut e) = self.feed.validate() {
            errors.append(&mut e);
        }
        if let Err(mut e) = self.scraper.validate() {
            errors.append(&mut e);
        }
        if let Err(mut e) = self.webhook.validate() {
            errors.append(&mut e);
        }
        if let Err(mut e) = self.state.validate() {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Joins validation errors into one line for logs and error messages
pub(crate) fn describe_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
