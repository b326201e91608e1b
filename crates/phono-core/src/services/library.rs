//! LibraryService - Background import pipeline
//!
//! Owns the library index and runs scans off the UI thread. A rescan walks
//! the configured roots, reconciles the result against the index with the
//! keyed diff, persists the snapshot, and publishes per-track change events
//! plus a completion summary.

use std::time::Instant;

use crossbeam::channel::{Receiver, Sender};

use super::messages::{AppEvent, LibraryCommand, ServiceHandle};
use crate::config::LibraryConfig;
use crate::library::{scanner, LibraryChanges, LibraryError, LibraryIndex, ProgressCallback, TrackMeta};
use crate::search::{self, SearchHit};

/// Publish scan progress every this many files
const SCAN_PROGRESS_STRIDE: usize = 25;

/// Minimum similarity for a search hit
const MIN_SEARCH_SCORE: f64 = 0.6;

/// LibraryService owns the index and handles scan/query commands
pub struct LibraryService {
    command_rx: Receiver<LibraryCommand>,
    event_tx: Sender<AppEvent>,
    config: LibraryConfig,
    index: LibraryIndex,
}

impl LibraryService {
    /// Spawn a new LibraryService in a background thread
    ///
    /// Loads the persisted snapshot (if any) before accepting commands, so
    /// the first rescan after a restart reports only real changes.
    pub fn spawn(
        config: LibraryConfig,
        event_tx: Sender<AppEvent>,
    ) -> Result<ServiceHandle<LibraryCommand>, String> {
        let (command_tx, command_rx) = crossbeam::channel::unbounded();
        let index = LibraryIndex::load(&config.snapshot_file());

        let service = LibraryService {
            command_rx,
            event_tx: event_tx.clone(),
            config,
            index,
        };

        let handle = std::thread::Builder::new()
            .name("library-service".into())
            .spawn(move || {
                service.run();
            })
            .map_err(|e| format!("Failed to spawn library service thread: {}", e))?;

        let _ = event_tx.send(AppEvent::ServiceStarted {
            service_name: "LibraryService".to_string(),
        });

        Ok(ServiceHandle {
            command_tx,
            thread_handle: Some(handle),
        })
    }

    /// Main service loop
    fn run(mut self) {
        log::info!(
            "LibraryService started ({} tracks in index)",
            self.index.len()
        );

        loop {
            match self.command_rx.recv() {
                Ok(LibraryCommand::Rescan { reply }) => {
                    let result = self.rescan().map_err(|e| e.to_string());
                    if let Err(e) = &result {
                        log::error!("Library rescan failed: {}", e);
                        let _ = self.event_tx.send(AppEvent::ServiceError {
                            service_name: "LibraryService".to_string(),
                            error: e.clone(),
                        });
                    }
                    let _ = reply.send(result);
                }
                Ok(LibraryCommand::GetTracks { reply }) => {
                    let _ = reply.send(self.index.all());
                }
                Ok(LibraryCommand::Search { query, limit, reply }) => {
                    let hits = search::rank_tracks(&query, self.index.iter(), MIN_SEARCH_SCORE, limit);
                    let _ = reply.send(hits);
                }
                Ok(LibraryCommand::Shutdown) => {
                    log::info!("LibraryService shutting down");
                    break;
                }
                Err(_) => {
                    log::info!("Command channel closed, shutting down");
                    break;
                }
            }
        }

        let _ = self.event_tx.send(AppEvent::ServiceStopped {
            service_name: "LibraryService".to_string(),
        });
        log::info!("LibraryService stopped");
    }

    /// Scan the roots, reconcile, persist, and publish change events
    fn rescan(&mut self) -> Result<LibraryChanges, LibraryError> {
        let started = Instant::now();
        let _ = self.event_tx.send(AppEvent::ScanStarted);

        let progress_tx = self.event_tx.clone();
        let progress: ProgressCallback = Box::new(move |scanned, total| {
            if scanned % SCAN_PROGRESS_STRIDE == 0 || scanned == total {
                let _ = progress_tx.send(AppEvent::ScanProgress { scanned, total });
            }
        });

        let scanned = scanner::scan_roots(
            &self.config.roots,
            &self.config.extensions,
            self.config.follow_symlinks,
            Some(progress),
        );

        let changes = self.index.reconcile(scanned);
        self.index.save(&self.config.snapshot_file())?;

        for track in &changes.added {
            let _ = self.event_tx.send(AppEvent::TrackAdded(track.clone()));
        }
        for track in &changes.modified {
            let _ = self.event_tx.send(AppEvent::TrackUpdated(track.clone()));
        }
        for track in &changes.removed {
            let _ = self
                .event_tx
                .send(AppEvent::TrackRemoved(track.rel_path.clone()));
        }

        let duration = started.elapsed();
        log::info!(
            "Library rescan finished in {:.1?}: {}",
            duration,
            changes.summary()
        );
        let _ = self.event_tx.send(AppEvent::ScanCompleted {
            added: changes.added.len(),
            removed: changes.removed.len(),
            modified: changes.modified.len(),
            duration,
        });

        Ok(changes)
    }
}

/// Client for interacting with the LibraryService
pub struct LibraryClient {
    command_tx: crossbeam::channel::Sender<LibraryCommand>,
}

impl LibraryClient {
    /// Create a new client from a service handle
    pub fn new(handle: &ServiceHandle<LibraryCommand>) -> Self {
        Self {
            command_tx: handle.command_tx.clone(),
        }
    }

    /// Rescan the library (blocking)
    pub fn rescan(&self) -> Result<LibraryChanges, String> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.command_tx
            .send(LibraryCommand::Rescan { reply: tx })
            .map_err(|e| e.to_string())?;

        rx.blocking_recv().map_err(|e| e.to_string())?
    }

    /// Get all tracks in the index (blocking)
    pub fn tracks(&self) -> Result<Vec<TrackMeta>, String> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.command_tx
            .send(LibraryCommand::GetTracks { reply: tx })
            .map_err(|e| e.to_string())?;

        rx.blocking_recv().map_err(|e| e.to_string())
    }

    /// Fuzzy-search the index (blocking)
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, String> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.command_tx
            .send(LibraryCommand::Search {
                query: query.to_string(),
                limit,
                reply: tx,
            })
            .map_err(|e| e.to_string())?;

        rx.blocking_recv().map_err(|e| e.to_string())
    }

    /// Shutdown the service
    pub fn shutdown(&self) -> Result<(), String> {
        self.command_tx
            .send(LibraryCommand::Shutdown)
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::messages::EventBus;
    use std::path::PathBuf;

    fn test_config(root: &std::path::Path, snapshot: PathBuf) -> LibraryConfig {
        LibraryConfig {
            roots: vec![root.to_path_buf()],
            snapshot_path: Some(snapshot),
            watch: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_rescan_reports_and_persists_changes() {
        let music = tempfile::tempdir().unwrap();
        let state = tempfile::tempdir().unwrap();
        let snapshot = state.path().join("snapshot.yaml");
        std::fs::write(music.path().join("a.mp3"), b"x").unwrap();
        std::fs::write(music.path().join("b.mp3"), b"xy").unwrap();

        let bus = EventBus::default();
        let handle =
            LibraryService::spawn(test_config(music.path(), snapshot.clone()), bus.sender()).unwrap();
        let client = LibraryClient::new(&handle);

        let changes = client.rescan().unwrap();
        assert_eq!(changes.added.len(), 2);
        assert!(changes.removed.is_empty());
        assert!(snapshot.exists());

        // Second scan with no changes is empty
        let changes = client.rescan().unwrap();
        assert!(changes.is_empty());

        // Delete a file and rescan
        std::fs::remove_file(music.path().join("b.mp3")).unwrap();
        let changes = client.rescan().unwrap();
        assert_eq!(changes.removed.len(), 1);

        let tracks = client.tracks().unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].rel_path, PathBuf::from("a.mp3"));

        client.shutdown().unwrap();
        if let Some(h) = handle.thread_handle {
            h.join().unwrap();
        }
    }

    #[test]
    fn test_index_survives_service_restart() {
        let music = tempfile::tempdir().unwrap();
        let state = tempfile::tempdir().unwrap();
        let snapshot = state.path().join("snapshot.yaml");
        std::fs::write(music.path().join("a.mp3"), b"x").unwrap();

        let bus = EventBus::default();
        let handle =
            LibraryService::spawn(test_config(music.path(), snapshot.clone()), bus.sender()).unwrap();
        let client = LibraryClient::new(&handle);
        assert_eq!(client.rescan().unwrap().added.len(), 1);
        client.shutdown().unwrap();
        if let Some(h) = handle.thread_handle {
            h.join().unwrap();
        }

        // A fresh service loads the snapshot: nothing new to report
        let handle =
            LibraryService::spawn(test_config(music.path(), snapshot), bus.sender()).unwrap();
        let client = LibraryClient::new(&handle);
        assert!(client.rescan().unwrap().is_empty());
        client.shutdown().unwrap();
        if let Some(h) = handle.thread_handle {
            h.join().unwrap();
        }
    }

    #[test]
    fn test_search_command_ranks_tracks() {
        let music = tempfile::tempdir().unwrap();
        let state = tempfile::tempdir().unwrap();
        std::fs::write(music.path().join("Teardrop.mp3"), b"x").unwrap();
        std::fs::write(music.path().join("Windowlicker.mp3"), b"x").unwrap();

        let bus = EventBus::default();
        let handle = LibraryService::spawn(
            test_config(music.path(), state.path().join("snapshot.yaml")),
            bus.sender(),
        )
        .unwrap();
        let client = LibraryClient::new(&handle);
        client.rescan().unwrap();

        let hits = client.search("teardrop", 5).unwrap();
        assert!(!hits.is_empty());
        assert_eq!(hits[0].track.rel_path, PathBuf::from("Teardrop.mp3"));

        client.shutdown().unwrap();
        if let Some(h) = handle.thread_handle {
            h.join().unwrap();
        }
    }

    #[test]
    fn test_scan_events_are_published() {
        let music = tempfile::tempdir().unwrap();
        let state = tempfile::tempdir().unwrap();
        std::fs::write(music.path().join("a.mp3"), b"x").unwrap();

        let bus = EventBus::default();
        let events = bus.subscribe();
        let handle = LibraryService::spawn(
            test_config(music.path(), state.path().join("snapshot.yaml")),
            bus.sender(),
        )
        .unwrap();
        let client = LibraryClient::new(&handle);
        client.rescan().unwrap();
        client.shutdown().unwrap();
        if let Some(h) = handle.thread_handle {
            h.join().unwrap();
        }

        let mut saw_started = false;
        let mut saw_added = false;
        let mut saw_completed = false;
        while let Ok(event) = events.try_recv() {
            match event {
                AppEvent::ScanStarted => saw_started = true,
                AppEvent::TrackAdded(track) => {
                    assert_eq!(track.rel_path, PathBuf::from("a.mp3"));
                    saw_added = true;
                }
                AppEvent::ScanCompleted { added, .. } => {
                    assert_eq!(added, 1);
                    saw_completed = true;
                }
                _ => {}
            }
        }
        assert!(saw_started && saw_added && saw_completed);
    }
}
