// crates/diff-engine/src/types.rs
//! Episode, marker and outcome types

use castrelay_feed_parser::FeedItem;
use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Title used when a feed entry has none
pub const UNTITLED_PLACEHOLDER: &str = "N/A";

/// Identifier of the most recently processed feed entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Marker(String);

impl Marker {
    /// Creates a marker from an entry identifier
    pub fn new(guid: impl Into<String>) -> Self {
        Self(guid.into())
    }

    /// Returns the marker as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Marker {
    fn from(guid: &str) -> Self {
        Self::new(guid)
    }
}

/// One feed entry as seen at the input boundary
///
/// `guid` stays optional here so that the diff can apply its skip rule;
/// everything else already carries its defaulted value.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    /// Unique identifier, `None` when the feed did not provide one
    pub guid: Option<String>,
    /// Title, [`UNTITLED_PLACEHOLDER`] when absent
    pub title: String,
    /// Episode page URL, empty when absent
    pub url: String,
    /// Publish time, absent when missing or unparseable
    pub published_at: Option<DateTime<Utc>>,
    /// URL of the first `audio/*` enclosure
    pub audio_url: Option<String>,
}

impl FeedEntry {
    /// Creates an entry with the given identifier and default fields
    pub fn new(guid: impl Into<String>) -> Self {
        Self {
            guid: Some(guid.into()),
            ..Self::without_guid()
        }
    }

    /// Creates an entry that has no identifier
    pub fn without_guid() -> Self {
        Self {
            guid: None,
            title: UNTITLED_PLACEHOLDER.to_string(),
            url: String::new(),
            published_at: None,
            audio_url: None,
        }
    }

    /// Sets the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the episode page URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Returns the usable identifier, if any
    ///
    /// Blank identifiers count as missing.
    pub fn identifier(&self) -> Option<&str> {
        self.guid
            .as_deref()
            .map(str::trim)
            .filter(|guid| !guid.is_empty())
    }
}

impl From<&FeedItem> for FeedEntry {
    fn from(item: &FeedItem) -> Self {
        Self {
            guid: item.guid.clone(),
            title: item
                .title
                .clone()
                .unwrap_or_else(|| UNTITLED_PLACEHOLDER.to_string()),
            url: item.url.clone().unwrap_or_default(),
            published_at: item.published,
            audio_url: item.audio_url().map(str::to_string),
        }
    }
}

/// A feed entry with a usable identifier, selected as new by the diff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub guid: String,
    pub title: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub audio_url: Option<String>,
}

impl Episode {
    /// Builds an episode from an entry, `None` when the entry has no identifier
    pub fn from_entry(entry: &FeedEntry) -> Option<Self> {
        let guid = entry.identifier()?;
        Some(Self {
            guid: guid.to_string(),
            title: entry.title.clone(),
            url: entry.url.clone(),
            published_at: entry.published_at,
            audio_url: entry.audio_url.clone(),
        })
    }

    /// Returns the marker that records this episode as processed
    pub fn marker(&self) -> Marker {
        Marker::new(self.guid.clone())
    }
}

/// Result of diffing a feed snapshot against the stored marker
#[derive(Debug, Clone, PartialEq)]
pub struct DiffOutcome {
    /// Marker that was in effect when the scan started
    pub previous_marker: Option<Marker>,
    /// New episodes, oldest first
    pub new_episodes: Vec<Episode>,
    /// Marker to persist, `None` means "leave the stored marker alone"
    pub next_marker: Option<Marker>,
}

impl DiffOutcome {
    /// An outcome with nothing new and no marker update
    pub fn unchanged(previous_marker: Option<Marker>) -> Self {
        Self {
            previous_marker,
            new_episodes: Vec::new(),
            next_marker: None,
        }
    }

    /// Returns true if at least one episode is new
    pub fn has_new_episodes(&self) -> bool {
        !self.new_episodes.is_empty()
    }

    /// Returns true if no marker existed when the scan started
    pub fn is_first_run(&self) -> bool {
        self.previous_marker.is_none()
    }

    /// Newest of the new episodes
    pub fn latest(&self) -> Option<&Episode> {
        self.new_episodes.last()
    }
}

/// Keys the marker identifier may be stored under, highest priority first
const GUID_KEYS: [&str; 3] = [
    "last_processed_episode_guid",
    "last_processed_identifier",
    "last_processed_guid",
];

const TIMESTAMP_KEY: &str = "last_checked_timestamp";

/// On-disk form of the marker
///
/// Older state files used `last_processed_identifier` or
/// `last_processed_guid` as the key and may lack a timestamp; both still load.
/// When several keys are present the current one wins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerRecord {
    pub last_processed_episode_guid: String,

    /// When the marker was captured. Informational only.
    pub last_checked_timestamp: Option<DateTime<Utc>>,
}

impl MarkerRecord {
    /// Creates a record for the marker, stamped with the current time
    pub fn new(marker: &Marker) -> Self {
        Self {
            last_processed_episode_guid: marker.as_str().to_string(),
            last_checked_timestamp: Some(Utc::now()),
        }
    }

    /// Returns the stored marker, `None` when the stored identifier is blank
    pub fn marker(&self) -> Option<Marker> {
        let guid = self.last_processed_episode_guid.trim();
        if guid.is_empty() {
            None
        } else {
            Some(Marker::new(guid))
        }
    }
}

impl<'de> Deserialize<'de> for MarkerRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = Map::<String, Value>::deserialize(deserializer)?;

        let guid = GUID_KEYS
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_str))
            .ok_or_else(|| D::Error::missing_field(GUID_KEYS[0]))?;

        Ok(Self {
            last_processed_episode_guid: guid.to_string(),
            last_checked_timestamp: fields.get(TIMESTAMP_KEY).and_then(lenient_timestamp),
        })
    }
}

/// Accepts any RFC 3339 string and maps everything else to `None`
fn lenient_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use castrelay_feed_parser::Enclosure;

    #[test]
    fn test_entry_from_item_defaults() {
        let item = FeedItem::default();
        let entry = FeedEntry::from(&item);

        assert_eq!(entry.guid, None);
        assert_eq!(entry.title, UNTITLED_PLACEHOLDER);
        assert_eq!(entry.url, "");
        assert_eq!(entry.published_at, None);
        assert_eq!(entry.audio_url, None);
    }

    #[test]
    fn test_entry_from_item_picks_first_audio_enclosure() {
        let item = FeedItem::new("Episode")
            .with_guid("ep-1")
            .with_enclosure(Enclosure::new("https://example.com/art.png").with_mime_type("image/png"))
            .with_enclosure(Enclosure::new("https://example.com/ep.m4a").with_mime_type("audio/x-m4a"))
            .with_enclosure(Enclosure::new("https://example.com/ep.mp3").with_mime_type("audio/mpeg"));

        let entry = FeedEntry::from(&item);
        assert_eq!(entry.audio_url.as_deref(), Some("https://example.com/ep.m4a"));
        assert_eq!(entry.identifier(), Some("ep-1"));
    }

    #[test]
    fn test_blank_identifier_is_missing() {
        let mut entry = FeedEntry::new("   ");
        assert_eq!(entry.identifier(), None);
        assert!(Episode::from_entry(&entry).is_none());

        entry.guid = Some(" ep-2 ".to_string());
        assert_eq!(entry.identifier(), Some("ep-2"));
    }

    #[test]
    fn test_record_accepts_legacy_keys() {
        let record: MarkerRecord =
            serde_json::from_str(r#"{"last_processed_guid": "old-1"}"#).unwrap();
        assert_eq!(record.marker(), Some(Marker::new("old-1")));
        assert_eq!(record.last_checked_timestamp, None);

        let record: MarkerRecord =
            serde_json::from_str(r#"{"last_processed_identifier": "old-2"}"#).unwrap();
        assert_eq!(record.marker(), Some(Marker::new("old-2")));
    }

    #[test]
    fn test_record_tolerates_bad_timestamp() {
        let json = r#"{
            "last_processed_episode_guid": "ep-9",
            "last_checked_timestamp": "yesterday-ish"
        }"#;
        let record: MarkerRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.marker(), Some(Marker::new("ep-9")));
        assert!(record.last_checked_timestamp.is_none());
    }

    #[test]
    fn test_record_reads_python_isoformat() {
        let json = r#"{
            "last_processed_episode_guid": "ep-9",
            "last_checked_timestamp": "2024-05-01T10:20:30.123456+00:00"
        }"#;
        let record: MarkerRecord = serde_json::from_str(json).unwrap();
        assert!(record.last_checked_timestamp.is_some());
    }

    #[test]
    fn test_record_ignores_non_string_timestamp() {
        let record: MarkerRecord = serde_json::from_str(
            r#"{"last_processed_episode_guid": "E2", "last_checked_timestamp": 1714558830}"#,
        )
        .unwrap();
        assert_eq!(record.marker(), Some(Marker::new("E2")));
        assert!(record.last_checked_timestamp.is_none());

        let record: MarkerRecord = serde_json::from_str(
            r#"{"last_processed_episode_guid": "E2", "last_checked_timestamp": {"at": "noon"}}"#,
        )
        .unwrap();
        assert_eq!(record.marker(), Some(Marker::new("E2")));
    }

    #[test]
    fn test_record_prefers_current_key_over_legacy() {
        let record: MarkerRecord = serde_json::from_str(
            r#"{"last_processed_guid": "E1", "last_processed_episode_guid": "E2"}"#,
        )
        .unwrap();
        assert_eq!(record.marker(), Some(Marker::new("E2")));

        let record: MarkerRecord = serde_json::from_str(
            r#"{"last_processed_guid": "E1", "last_processed_identifier": "E3"}"#,
        )
        .unwrap();
        assert_eq!(record.marker(), Some(Marker::new("E3")));
    }

    #[test]
    fn test_record_without_identifier_is_rejected() {
        let result: Result<MarkerRecord, _> =
            serde_json::from_str(r#"{"last_checked_timestamp": "2024-05-01T10:20:30Z"}"#);
        assert!(result.is_err());

        let result: Result<MarkerRecord, _> = serde_json::from_str("[1, 2]");
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_record_has_no_marker() {
        let record = MarkerRecord {
            last_processed_episode_guid: "  ".to_string(),
            last_checked_timestamp: None,
        };
        assert_eq!(record.marker(), None);
    }
}
