//! Marker state configuration section

use crate::validation::{ConfigSection, ValidationError};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File name of the marker inside the data directory
pub const MARKER_FILE_NAME: &str = "last_check.json";

/// Default marker location: the platform data directory, or the working
/// directory when no home directory can be resolved
pub fn default_marker_path() -> PathBuf {
    ProjectDirs::from("", "", "castrelay")
        .map(|dirs| dirs.data_dir().join(MARKER_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(MARKER_FILE_NAME))
}

/// Where the last-processed marker lives and when it may advance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StateConfig {
    /// Path of the JSON marker file
    pub marker_path: PathBuf,

    /// Only advance the marker when the webhook delivery succeeded
    pub require_delivery: bool,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            marker_path: default_marker_path(),
            require_delivery: false,
        }
    }
}

impl ConfigSection for StateConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        if self.marker_path.as_os_str().is_empty() {
            return Err(vec![ValidationError::new(
                "state.marker_path",
                "must not be empty",
            )]);
        }
        Ok(())
    }

    fn section_name(&self) -> &'static str {
        "state"
    }
}
