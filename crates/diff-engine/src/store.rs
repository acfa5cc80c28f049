// crates/diff-engine/src/store.rs
//! Marker persistence
//!
//! The engine only talks to the [`MarkerStore`] trait. [`JsonMarkerStore`]
//! keeps the marker in a small JSON file; [`MemoryMarkerStore`] keeps it in
//! memory for tests and dry runs.
//!
//! There is no locking. Two runs that overlap can both read the same marker
//! and both report the same episodes; the scheduler is expected to prevent
//! overlapping runs.

use crate::error::{DiffError, DiffResult};
use crate::types::{Marker, MarkerRecord};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Storage for the last-processed marker
pub trait MarkerStore {
    /// Reads the stored record, `Ok(None)` when nothing has been stored yet
    fn read_record(&self) -> DiffResult<Option<MarkerRecord>>;

    /// Replaces the stored record
    fn write_record(&self, record: &MarkerRecord) -> DiffResult<()>;

    /// Removes the stored record, returns whether one existed
    fn clear(&self) -> DiffResult<bool>;

    /// Reads the stored marker, treating any read failure as "no marker"
    fn load_marker(&self) -> Option<Marker> {
        match self.read_record() {
            Ok(record) => record.and_then(|r| r.marker()),
            Err(e) => {
                log::warn!("{}. Treating as no stored marker", e);
                None
            }
        }
    }
}

impl<S: MarkerStore + ?Sized> MarkerStore for &S {
    fn read_record(&self) -> DiffResult<Option<MarkerRecord>> {
        (**self).read_record()
    }

    fn write_record(&self, record: &MarkerRecord) -> DiffResult<()> {
        (**self).write_record(record)
    }

    fn clear(&self) -> DiffResult<bool> {
        (**self).clear()
    }
}

/// Marker stored as a pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct JsonMarkerStore {
    path: PathBuf,
}

impl JsonMarkerStore {
    /// Creates a store backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory the file lives in, `.` for bare file names
    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl MarkerStore for JsonMarkerStore {
    fn read_record(&self) -> DiffResult<Option<MarkerRecord>> {
        if !self.path.exists() {
            log::debug!("No marker file at {}", self.path.display());
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| DiffError::Read {
            path: self.path.clone(),
            source: e,
        })?;

        if contents.trim().is_empty() {
            return Err(DiffError::Corrupt {
                path: self.path.clone(),
                reason: "file is empty".to_string(),
            });
        }

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| DiffError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })
    }

    /// Writes through a temp file in the same directory and renames it into
    /// place, so a crash never leaves a half-written marker behind.
    fn write_record(&self, record: &MarkerRecord) -> DiffResult<()> {
        let dir = self.parent_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| DiffError::Write {
                path: dir.clone(),
                source: e,
            })?;
            log::info!("Created state directory: {}", dir.display());
        }

        let json = serde_json::to_string_pretty(record)?;

        let mut temp_file = NamedTempFile::new_in(&dir).map_err(|e| DiffError::Write {
            path: self.path.clone(),
            source: e,
        })?;
        write_contents(&mut temp_file, &json).map_err(|e| DiffError::Write {
            path: self.path.clone(),
            source: e,
        })?;
        temp_file.persist(&self.path).map_err(|e| DiffError::Write {
            path: self.path.clone(),
            source: e.error,
        })?;

        log::debug!("Marker written to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> DiffResult<bool> {
        if !self.path.exists() {
            return Ok(false);
        }

        fs::remove_file(&self.path).map_err(|e| DiffError::Write {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(true)
    }
}

fn write_contents(file: &mut NamedTempFile, json: &str) -> std::io::Result<()> {
    file.write_all(json.as_bytes())?;
    file.write_all(b"\n")?;
    file.flush()
}

/// Marker kept in memory
#[derive(Debug, Default)]
pub struct MemoryMarkerStore {
    record: Mutex<Option<MarkerRecord>>,
    writes: AtomicUsize,
}

impl MemoryMarkerStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `guid`
    pub fn with_marker(guid: impl Into<String>) -> Self {
        let store = Self::new();
        if let Ok(mut record) = store.record.lock() {
            *record = Some(MarkerRecord::new(&Marker::new(guid)));
        }
        store
    }

    /// Creates a store holding a copy of another store's record
    pub fn snapshot_of<S: MarkerStore + ?Sized>(other: &S) -> Self {
        let store = Self::new();
        if let (Ok(Some(existing)), Ok(mut record)) = (other.read_record(), store.record.lock()) {
            *record = Some(existing);
        }
        store
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Currently stored marker
    pub fn current_marker(&self) -> Option<Marker> {
        self.record
            .lock()
            .ok()
            .and_then(|record| record.as_ref().and_then(MarkerRecord::marker))
    }
}

impl MarkerStore for MemoryMarkerStore {
    fn read_record(&self) -> DiffResult<Option<MarkerRecord>> {
        let record = self
            .record
            .lock()
            .map_err(|_| DiffError::Storage("Lock poisoned".to_string()))?;
        Ok(record.clone())
    }

    fn write_record(&self, new_record: &MarkerRecord) -> DiffResult<()> {
        let mut record = self
            .record
            .lock()
            .map_err(|_| DiffError::Storage("Lock poisoned".to_string()))?;
        *record = Some(new_record.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self) -> DiffResult<bool> {
        let mut record = self
            .record
            .lock()
            .map_err(|_| DiffError::Storage("Lock poisoned".to_string()))?;
        Ok(record.take().is_some())
    }
}
