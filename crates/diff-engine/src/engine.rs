// crates/diff-engine/src/engine.rs
//! New-episode detection

use crate::error::DiffResult;
use crate::store::MarkerStore;
use crate::types::{DiffOutcome, Episode, FeedEntry, Marker, MarkerRecord};

/// Works out which entries are new relative to `marker`
///
/// `entries` must be newest-first, the way feeds deliver them. The scan stops
/// at the first entry whose identifier equals the marker; entries without an
/// identifier are skipped and never stop the scan.
///
/// With no marker (first run) only the newest entry is reported, so a fresh
/// install does not replay the whole back catalogue. Otherwise every entry
/// above the marker is reported, oldest first, and the next marker is the
/// newest of them.
pub fn diff_entries(entries: &[FeedEntry], marker: Option<&Marker>) -> DiffOutcome {
    let previous_marker = marker.cloned();

    if entries.is_empty() {
        log::debug!("Feed has no entries");
        return DiffOutcome::unchanged(previous_marker);
    }

    let mut collected = Vec::new();
    for entry in entries {
        let Some(guid) = entry.identifier() else {
            log::debug!("Skipping entry without identifier: {}", entry.title);
            continue;
        };

        if marker.is_some_and(|m| m.as_str() == guid) {
            break;
        }

        collected.extend(Episode::from_entry(entry));
    }

    if collected.is_empty() {
        return DiffOutcome::unchanged(previous_marker);
    }

    let new_episodes = if marker.is_none() {
        collected.truncate(1);
        collected
    } else {
        collected.reverse();
        collected
    };

    let next_marker = new_episodes.last().map(Episode::marker);

    DiffOutcome {
        previous_marker,
        new_episodes,
        next_marker,
    }
}

/// Diff engine bound to a marker store
///
/// A run is `detect` followed by at most one `commit`. The marker is read
/// once, in `detect`, and written once, in `commit`.
pub struct EpisodeDiffEngine<S> {
    store: S,
}

impl<S: MarkerStore> EpisodeDiffEngine<S> {
    /// Creates an engine over the given store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the stored marker and diffs `entries` against it
    ///
    /// Never fails: an unreadable marker is treated as a first run.
    pub fn detect(&self, entries: &[FeedEntry]) -> DiffOutcome {
        let marker = self.store.load_marker();
        match &marker {
            Some(m) => log::info!("Last processed episode: {}", m),
            None => log::info!("No stored marker, treating this as a first run"),
        }

        let outcome = diff_entries(entries, marker.as_ref());
        log::info!(
            "Scanned {} feed entries, {} new",
            entries.len(),
            outcome.new_episodes.len()
        );
        outcome
    }

    /// Persists the outcome's next marker
    ///
    /// Returns `Ok(false)` without touching the store when the outcome carries
    /// no marker update.
    pub fn commit(&self, outcome: &DiffOutcome) -> DiffResult<bool> {
        let Some(marker) = &outcome.next_marker else {
            return Ok(false);
        };

        self.store.write_record(&MarkerRecord::new(marker))?;
        log::info!("Saved marker {}", marker);
        Ok(true)
    }

    /// Detects new episodes and commits the marker straight away
    pub fn check_new_episodes(&self, entries: &[FeedEntry]) -> DiffResult<DiffOutcome> {
        let outcome = self.detect(entries);
        self.commit(&outcome)?;
        Ok(outcome)
    }
}
