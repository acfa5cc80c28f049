//! Configuration manager - main API for config operations

use crate::persistence::ConfigPersistence;
use crate::{Config, ConfigError, ConfigResult, LogLevel, ScrapeMode};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Environment variable that can override one config field
#[derive(Debug, Clone, Copy)]
pub struct EnvOverride {
    /// Variable name
    pub name: &'static str,
    /// Config field it replaces
    pub field: &'static str,
    apply: fn(&mut Config, &str) -> Option<()>,
}

impl EnvOverride {
    /// Writes `value` into the field, rejecting values that don't parse
    pub fn apply(&self, config: &mut Config, value: &str) -> ConfigResult<()> {
        (self.apply)(config, value).ok_or_else(|| ConfigError::InvalidEnvOverride {
            name: self.name.to_string(),
            value: value.to_string(),
        })
    }
}

/// Every recognised override, in the order they are applied
pub const ENV_OVERRIDES: &[EnvOverride] = &[
    EnvOverride {
        name: "STANDFM_RSS_URL",
        field: "feed.rss_url",
        apply: set_rss_url,
    },
    EnvOverride {
        name: "VOICY_CHANNEL_URL",
        field: "scraper.channel_url",
        apply: set_channel_url,
    },
    EnvOverride {
        name: "CASTRELAY_SCRAPE_MODE",
        field: "scraper.mode",
        apply: set_scrape_mode,
    },
    EnvOverride {
        name: "MAKE_WEBHOOK_URL",
        field: "webhook.url",
        apply: set_webhook_url,
    },
    EnvOverride {
        name: "CASTRELAY_STATE_PATH",
        field: "state.marker_path",
        apply: set_marker_path,
    },
    EnvOverride {
        name: "CASTRELAY_LOG_LEVEL",
        field: "app.log_level",
        apply: set_log_level,
    },
    EnvOverride {
        name: "CASTRELAY_REQUIRE_DELIVERY",
        field: "state.require_delivery",
        apply: set_require_delivery,
    },
];

fn set_rss_url(config: &mut Config, value: &str) -> Option<()> {
    config.feed.rss_url = value.to_string();
    Some(())
}

fn set_channel_url(config: &mut Config, value: &str) -> Option<()> {
    config.scraper.channel_url = value.to_string();
    Some(())
}

fn set_scrape_mode(config: &mut Config, value: &str) -> Option<()> {
    config.scraper.mode = value.parse::<ScrapeMode>().ok()?;
    Some(())
}

fn set_webhook_url(config: &mut Config, value: &str) -> Option<()> {
    config.webhook.url = value.to_string();
    Some(())
}

fn set_marker_path(config: &mut Config, value: &str) -> Option<()> {
    config.state.marker_path = PathBuf::from(value);
    Some(())
}

fn set_log_level(config: &mut Config, value: &str) -> Option<()> {
    config.app.log_level = value.parse::<LogLevel>().ok()?;
    Some(())
}

fn set_require_delivery(config: &mut Config, value: &str) -> Option<()> {
    config.state.require_delivery = parse_flag(value)?;
    Some(())
}

/// Applies environment overrides using `lookup` to read variables
///
/// Empty values count as unset. Returns the names of the variables that were
/// applied.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> ConfigResult<Vec<&'static str>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = Vec::new();

    for var in ENV_OVERRIDES {
        let Some(value) = lookup(var.name).filter(|v| !v.trim().is_empty()) else {
            continue;
        };

        var.apply(config, value.trim())?;
        applied.push(var.name);
    }

    Ok(applied)
}

/// Result of loading the config file with environment overrides on top
///
/// Nothing is logged while loading, so a caller can set up logging from the
/// loaded config first and then report through [`LoadedConfig::log_summary`].
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    /// False when the file was missing and defaults were used
    pub file_found: bool,
    /// Names of the environment variables that were applied
    pub env_overrides: Vec<&'static str>,
    /// Validation problems in the effective config
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Logs how the config was assembled and any validation warnings
    pub fn log_summary(&self, config_path: &Path) {
        if !self.file_found {
            log::info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
        }
        if !self.env_overrides.is_empty() {
            log::info!(
                "Environment overrides applied: {}",
                self.env_overrides.join(", ")
            );
        }
        if !self.warnings.is_empty() {
            log::warn!("Config validation warnings: {}", self.warnings.join("; "));
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Main configuration manager
///
/// This is the primary interface for loading, saving, and managing configuration.
pub struct ConfigManager {
    persistence: ConfigPersistence,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a new config manager using the default config directory
    ///
    /// - Linux: `~/.config/castrelay/`
    /// - macOS: `~/Library/Application Support/castrelay/`
    /// - Windows: `%APPDATA%\castrelay\`
    pub fn new() -> ConfigResult<Self> {
        let config_dir = Self::default_config_dir()?;
        Self::with_directory(config_dir)
    }

    /// Creates a config manager with a custom config directory
    pub fn with_directory(config_dir: PathBuf) -> ConfigResult<Self> {
        Self::with_file(config_dir.join("config.toml"))
    }

    /// Creates a config manager for an explicit config file
    pub fn with_file(config_path: PathBuf) -> ConfigResult<Self> {
        if config_path.as_os_str().is_empty() {
            return Err(ConfigError::PathResolutionError {
                reason: "Config file path is empty".to_string(),
            });
        }

        Ok(Self {
            persistence: ConfigPersistence::new(config_path.clone()),
            config_path,
        })
    }

    fn default_config_dir() -> ConfigResult<PathBuf> {
        ProjectDirs::from("", "", "castrelay")
            .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
            .ok_or_else(|| ConfigError::PathResolutionError {
                reason: "Could not determine user config directory".to_string(),
            })
    }

    /// Returns the full config file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Loads the configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file is corrupted, returns an error.
    pub fn load(&self) -> ConfigResult<Config> {
        self.persistence.load()
    }

    /// Loads the configuration, falling back to defaults on any error
    pub fn load_or_default(&self) -> Config {
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config: {}, using defaults", e);
                Config::default()
            }
        }
    }

    /// Saves the configuration to file
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.persistence.save(config)
    }

    /// Loads the current config, applies `update_fn` and saves the result
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use castrelay_config::ConfigManager;
    /// # let manager = ConfigManager::new().unwrap();
    /// manager.update(|config| {
    ///     config.state.require_delivery = true;
    /// }).expect("Failed to update config");
    /// ```
    pub fn update<F>(&self, update_fn: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        update_fn(&mut config);
        self.save(&config)
    }

    /// Writes a default config file if one doesn't exist
    ///
    /// Returns Ok(true) if a new file was created, Ok(false) if one already exists.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.config_path.exists() {
            log::info!(
                "Config file already exists at {}",
                self.config_path.display()
            );
            return Ok(false);
        }

        self.persistence.generate_default()?;
        Ok(true)
    }

    /// Validates the current configuration file
    ///
    /// Returns all validation errors found, or an empty list if valid.
    pub fn validate(&self) -> ConfigResult<Vec<String>> {
        Ok(self.load_with_env_overrides()?.warnings)
    }

    /// Loads the config file and applies environment overrides on top
    ///
    /// See [`ENV_OVERRIDES`] for the recognised variables.
    pub fn load_with_env_overrides(&self) -> ConfigResult<LoadedConfig> {
        self.load_with_lookup(|name| std::env::var(name).ok())
    }

    fn load_with_lookup<F>(&self, lookup: F) -> ConfigResult<LoadedConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_found = self.config_path.exists();
        let mut config = self.persistence.read()?;
        let env_overrides = apply_env_overrides(&mut config, lookup)?;

        let warnings = match config.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
        };

        Ok(LoadedConfig {
            config,
            file_found,
            env_overrides,
            warnings,
        })
    }
}
