//! Local music library: scanning and change detection
//!
//! This module is the local media provider. A scan walks the configured
//! library roots and produces a snapshot of track metadata; the snapshot is
//! reconciled against the in-memory index with the keyed diff engine to work
//! out exactly which tracks were added, removed, or modified since the last
//! scan. The index persists to a YAML snapshot file so change detection
//! survives restarts.

pub mod metadata;
pub mod scanner;

pub use metadata::{read_tags, TrackTags};
pub use scanner::{scan_roots, ProgressCallback};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::diff::{self, Keyed};

/// Snapshot format version; bump when TrackMeta changes incompatibly
const SNAPSHOT_VERSION: u32 = 1;

/// Errors from library operations
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot serialization failed: {0}")]
    Snapshot(#[from] serde_yaml::Error),

    #[error("unsupported or corrupt audio file: {0}")]
    Probe(String),
}

/// Metadata snapshot of a single track in the library
///
/// Identity is the library-relative path; everything else counts as
/// contents for change detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackMeta {
    /// Path relative to the library root that contained the file
    pub rel_path: PathBuf,
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modified time
    pub mtime: SystemTime,
    /// Tag metadata (empty for files whose tags couldn't be read)
    pub tags: TrackTags,
}

impl TrackMeta {
    /// Title for display: the tag title, or the filename without extension
    pub fn display_title(&self) -> String {
        self.tags.title.clone().unwrap_or_else(|| {
            self.rel_path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default()
        })
    }
}

impl Keyed for TrackMeta {
    type Key = PathBuf;

    fn key(&self) -> Self::Key {
        self.rel_path.clone()
    }

    fn contents_eq(&self, other: &Self) -> bool {
        self.size == other.size && self.mtime == other.mtime && self.tags == other.tags
    }
}

/// Changes detected by reconciling a scan against the index
#[derive(Debug, Clone, Default)]
pub struct LibraryChanges {
    /// Tracks that appeared since the last scan
    pub added: Vec<TrackMeta>,
    /// Tracks that disappeared since the last scan
    pub removed: Vec<TrackMeta>,
    /// Tracks still present but with changed size, mtime, or tags
    pub modified: Vec<TrackMeta>,
}

impl LibraryChanges {
    /// Check if the scan found nothing new
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    /// Get summary for display and logging
    pub fn summary(&self) -> String {
        format!(
            "{} added, {} removed, {} modified",
            self.added.len(),
            self.removed.len(),
            self.modified.len()
        )
    }
}

/// On-disk snapshot wrapper
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    generated_at: String,
    tracks: Vec<TrackMeta>,
}

/// In-memory library index keyed by relative path
#[derive(Debug, Default)]
pub struct LibraryIndex {
    tracks: HashMap<PathBuf, TrackMeta>,
}

impl LibraryIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracks in the index
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Look up a track by its relative path
    pub fn get(&self, rel_path: &Path) -> Option<&TrackMeta> {
        self.tracks.get(rel_path)
    }

    /// Iterate over all tracks (no ordering guarantee)
    pub fn iter(&self) -> impl Iterator<Item = &TrackMeta> {
        self.tracks.values()
    }

    /// All tracks as an owned list (no ordering guarantee)
    pub fn all(&self) -> Vec<TrackMeta> {
        self.tracks.values().cloned().collect()
    }

    /// Reconcile a fresh scan against the index
    ///
    /// Runs the keyed diff between the current index contents and the scan
    /// result, applies the changes to the index, and returns them for
    /// downstream consumers (event publication, persistence).
    pub fn reconcile(&mut self, scanned: Vec<TrackMeta>) -> LibraryChanges {
        let old: Vec<TrackMeta> = self.tracks.values().cloned().collect();
        let result = diff::diff(&old, &scanned);

        for track in &result.deletions {
            self.tracks.remove(&track.rel_path);
        }
        for track in result.insertions.iter().chain(result.updates.iter()) {
            self.tracks.insert(track.rel_path.clone(), track.clone());
        }

        LibraryChanges {
            added: result.insertions,
            removed: result.deletions,
            modified: result.updates,
        }
    }

    /// Load an index from a snapshot file
    ///
    /// A missing, unreadable, or incompatible snapshot starts the index
    /// empty (the next scan simply reports everything as added).
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::info!("No library snapshot at {:?}, starting empty", path);
            return Self::new();
        }

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                log::warn!("Failed to read library snapshot: {}, starting empty", e);
                return Self::new();
            }
        };

        let snapshot: Snapshot = match serde_yaml::from_str(&contents) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("Failed to parse library snapshot: {}, starting empty", e);
                return Self::new();
            }
        };

        if snapshot.version != SNAPSHOT_VERSION {
            log::warn!(
                "Library snapshot version {} != {}, starting empty",
                snapshot.version,
                SNAPSHOT_VERSION
            );
            return Self::new();
        }

        let mut index = Self::new();
        for track in snapshot.tracks {
            index.tracks.insert(track.rel_path.clone(), track);
        }
        log::info!("Loaded library snapshot with {} tracks", index.len());
        index
    }

    /// Save the index to a snapshot file
    pub fn save(&self, path: &Path) -> Result<(), LibraryError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            generated_at: chrono::Local::now().to_rfc3339(),
            tracks: self.tracks.values().cloned().collect(),
        };

        let yaml = serde_yaml::to_string(&snapshot)?;
        std::fs::write(path, yaml)?;
        log::debug!("Saved library snapshot ({} tracks) to {:?}", self.len(), path);
        Ok(())
    }
}
