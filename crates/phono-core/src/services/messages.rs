//! Message types for service communication
//!
//! Commands are request-reply over oneshot channels; events are published to
//! the event bus for any interested subscriber. Services never call each
//! other directly.

use std::path::PathBuf;
use std::time::Duration;

use crate::library::{LibraryChanges, TrackMeta};
use crate::search::SearchHit;

/// Commands sent to the LibraryService
pub enum LibraryCommand {
    /// Rescan the library roots and reconcile against the index
    Rescan {
        reply: tokio::sync::oneshot::Sender<Result<LibraryChanges, String>>,
    },

    /// Get all tracks currently in the index
    GetTracks {
        reply: tokio::sync::oneshot::Sender<Vec<TrackMeta>>,
    },

    /// Fuzzy-search the index by title, artist, or album
    Search {
        query: String,
        limit: usize,
        reply: tokio::sync::oneshot::Sender<Vec<SearchHit>>,
    },

    /// Shutdown the service
    Shutdown,
}

/// Commands sent to the WatchService
pub enum WatchCommand {
    /// Start watching a directory for changes
    Watch {
        path: PathBuf,
        reply: tokio::sync::oneshot::Sender<Result<(), String>>,
    },

    /// Stop watching a directory
    Unwatch {
        path: PathBuf,
        reply: tokio::sync::oneshot::Sender<Result<(), String>>,
    },

    /// Shutdown the service
    Shutdown,
}

/// Events published to the event bus
#[derive(Debug, Clone)]
pub enum AppEvent {
    // --- Scan events ---
    /// A library rescan started
    ScanStarted,

    /// Rescan progress (throttled; not every file is reported)
    ScanProgress { scanned: usize, total: usize },

    /// A library rescan finished
    ScanCompleted {
        added: usize,
        removed: usize,
        modified: usize,
        duration: Duration,
    },

    // --- Track events ---
    /// A track appeared in the library
    TrackAdded(TrackMeta),

    /// A track's size, mtime, or tags changed
    TrackUpdated(TrackMeta),

    /// A track disappeared from the library (by relative path)
    TrackRemoved(PathBuf),

    // --- File system events ---
    /// An audio file was created in a watched directory
    FileCreated(PathBuf),

    /// An audio file was modified in a watched directory
    FileModified(PathBuf),

    /// An audio file was deleted from a watched directory
    FileDeleted(PathBuf),

    // --- Service events ---
    /// A service started
    ServiceStarted { service_name: String },

    /// A service stopped
    ServiceStopped { service_name: String },

    /// A service encountered an error
    ServiceError {
        service_name: String,
        error: String,
    },
}

/// Handle for communicating with a background service
pub struct ServiceHandle<Cmd> {
    /// Channel for sending commands to the service
    pub command_tx: crossbeam::channel::Sender<Cmd>,
    /// Thread handle for the service
    pub thread_handle: Option<std::thread::JoinHandle<()>>,
}

impl<Cmd> ServiceHandle<Cmd> {
    /// Send a command to the service
    pub fn send(&self, cmd: Cmd) -> Result<(), crossbeam::channel::SendError<Cmd>> {
        self.command_tx.send(cmd)
    }

    /// Check if the service thread is still running
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Wait for the service thread to finish
    pub fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

/// Event bus connecting services to their subscribers
///
/// Backed by a bounded crossbeam channel; cloned receivers compete for
/// events, so use one subscriber per consumer role.
pub struct EventBus {
    sender: crossbeam::channel::Sender<AppEvent>,
    receiver: crossbeam::channel::Receiver<AppEvent>,
}

impl EventBus {
    /// Create a new event bus with bounded capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = crossbeam::channel::bounded(capacity);
        Self { sender, receiver }
    }

    /// Get a sender for publishing events
    pub fn sender(&self) -> crossbeam::channel::Sender<AppEvent> {
        self.sender.clone()
    }

    /// Get a receiver for consuming events
    pub fn subscribe(&self) -> crossbeam::channel::Receiver<AppEvent> {
        self.receiver.clone()
    }

    /// Publish an event
    pub fn publish(&self, event: AppEvent) -> Result<(), crossbeam::channel::SendError<AppEvent>> {
        self.sender.send(event)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
