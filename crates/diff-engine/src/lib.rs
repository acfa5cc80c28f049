// crates/diff-engine/src/lib.rs
//! New-episode detection for polled podcast feeds
//!
//! Given the entries of a feed (newest first) and the identifier of the last
//! episode already handled, this crate decides which entries are new and
//! which identifier to remember next time.
//!
//! - [`diff_entries`] is the pure decision function
//! - [`EpisodeDiffEngine`] wraps it with a [`MarkerStore`], reading the marker
//!   once per run and writing it at most once
//! - [`JsonMarkerStore`] persists the marker as a small JSON file
//!
//! # Example
//!
//! ```rust
//! use castrelay_diff_engine::{EpisodeDiffEngine, FeedEntry, MemoryMarkerStore};
//!
//! let engine = EpisodeDiffEngine::new(MemoryMarkerStore::with_marker("ep-2"));
//! let feed = vec![FeedEntry::new("ep-4"), FeedEntry::new("ep-3"), FeedEntry::new("ep-2")];
//!
//! let outcome = engine.check_new_episodes(&feed).expect("marker write failed");
//! let guids: Vec<_> = outcome.new_episodes.iter().map(|e| e.guid.as_str()).collect();
//! assert_eq!(guids, vec!["ep-3", "ep-4"]);
//! ```

mod engine;
mod error;
mod store;
mod types;

pub use engine::{diff_entries, EpisodeDiffEngine};
pub use error::{DiffError, DiffResult};
pub use store::{JsonMarkerStore, MarkerStore, MemoryMarkerStore};
pub use types::{DiffOutcome, Episode, FeedEntry, Marker, MarkerRecord, UNTITLED_PLACEHOLDER};
