//! WatchService - Auto-import via file system monitoring
//!
//! Uses the `notify` crate to watch library roots. Individual audio-file
//! events are published for subscribers, and once changes have settled for
//! the configured debounce period the service requests a library rescan -
//! so dropping an album into a watched folder imports it without touching
//! anything.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossbeam::channel::{Receiver, Sender};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::messages::{AppEvent, LibraryCommand, ServiceHandle, WatchCommand};
use crate::config::LibraryConfig;
use crate::library::scanner::has_audio_extension;

/// Configuration for the WatchService
#[derive(Debug, Clone)]
pub struct WatchServiceConfig {
    /// Quiet period before changed files trigger a rescan
    pub debounce: Duration,
    /// Audio extensions considered relevant (case-insensitive)
    pub extensions: Vec<String>,
}

impl WatchServiceConfig {
    /// Derive watch settings from the library configuration
    pub fn from_library(config: &LibraryConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.watch_debounce_ms),
            extensions: config.extensions.clone(),
        }
    }
}

/// WatchService monitors directories and triggers debounced rescans
pub struct WatchService {
    command_rx: Receiver<WatchCommand>,
    event_tx: Sender<AppEvent>,
    library_tx: Sender<LibraryCommand>,
    config: WatchServiceConfig,
}

impl WatchService {
    /// Spawn a new WatchService in a background thread
    ///
    /// `library_tx` is the LibraryService command channel the rescan
    /// requests go to.
    pub fn spawn(
        config: WatchServiceConfig,
        event_tx: Sender<AppEvent>,
        library_tx: Sender<LibraryCommand>,
    ) -> Result<ServiceHandle<WatchCommand>, String> {
        let (command_tx, command_rx) = crossbeam::channel::unbounded();

        let service = WatchService {
            command_rx,
            event_tx: event_tx.clone(),
            library_tx,
            config,
        };

        let handle = std::thread::Builder::new()
            .name("watch-service".into())
            .spawn(move || {
                service.run();
            })
            .map_err(|e| format!("Failed to spawn watch service thread: {}", e))?;

        let _ = event_tx.send(AppEvent::ServiceStarted {
            service_name: "WatchService".to_string(),
        });

        Ok(ServiceHandle {
            command_tx,
            thread_handle: Some(handle),
        })
    }

    /// Main service loop
    fn run(self) {
        log::info!("WatchService started");

        let (watcher_tx, watcher_rx) = crossbeam::channel::unbounded();

        let mut watcher: RecommendedWatcher =
            match notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    let _ = watcher_tx.send(event);
                }
            }) {
                Ok(w) => w,
                Err(e) => {
                    log::error!("Failed to create file watcher: {}", e);
                    let _ = self.event_tx.send(AppEvent::ServiceError {
                        service_name: "WatchService".to_string(),
                        error: e.to_string(),
                    });
                    return;
                }
            };

        let mut watched: HashSet<PathBuf> = HashSet::new();
        // Deadline for the pending rescan; pushed back on every new change
        let mut rescan_due: Option<Instant> = None;

        loop {
            crossbeam::select! {
                recv(self.command_rx) -> cmd => {
                    match cmd {
                        Ok(WatchCommand::Watch { path, reply }) => {
                            let result = Self::add_watch(&mut watcher, &mut watched, path);
                            let _ = reply.send(result);
                        }
                        Ok(WatchCommand::Unwatch { path, reply }) => {
                            let result = Self::remove_watch(&mut watcher, &mut watched, &path);
                            let _ = reply.send(result);
                        }
                        Ok(WatchCommand::Shutdown) => {
                            log::info!("WatchService shutting down");
                            break;
                        }
                        Err(_) => {
                            log::info!("Command channel closed, shutting down");
                            break;
                        }
                    }
                }
                recv(watcher_rx) -> event => {
                    if let Ok(event) = event {
                        if self.publish_file_events(event) {
                            rescan_due = Some(Instant::now() + self.config.debounce);
                        }
                    }
                }
                default(Duration::from_millis(100)) => {
                    if rescan_due.is_some_and(|due| Instant::now() >= due) {
                        rescan_due = None;
                        self.request_rescan();
                    }
                }
            }
        }

        let _ = self.event_tx.send(AppEvent::ServiceStopped {
            service_name: "WatchService".to_string(),
        });
        log::info!("WatchService stopped");
    }

    /// Add a directory to the watcher
    fn add_watch(
        watcher: &mut RecommendedWatcher,
        watched: &mut HashSet<PathBuf>,
        path: PathBuf,
    ) -> Result<(), String> {
        if !path.is_dir() {
            return Err(format!("Not a watchable directory: {}", path.display()));
        }
        if watched.contains(&path) {
            return Ok(());
        }

        watcher
            .watch(&path, RecursiveMode::Recursive)
            .map_err(|e| format!("Failed to watch path: {}", e))?;

        log::info!("Now watching: {}", path.display());
        watched.insert(path);
        Ok(())
    }

    /// Remove a directory from the watcher
    fn remove_watch(
        watcher: &mut RecommendedWatcher,
        watched: &mut HashSet<PathBuf>,
        path: &PathBuf,
    ) -> Result<(), String> {
        watcher
            .unwatch(path)
            .map_err(|e| format!("Failed to unwatch path: {}", e))?;

        watched.remove(path);
        log::info!("Stopped watching: {}", path.display());
        Ok(())
    }

    /// Publish events for affected audio files
    ///
    /// Returns true when the event touched at least one audio file and
    /// should push back the rescan deadline.
    fn publish_file_events(&self, event: Event) -> bool {
        let kind = event.kind;
        let mut relevant = false;

        for path in event.paths {
            if !has_audio_extension(&path, &self.config.extensions) {
                continue;
            }

            let app_event = match kind {
                EventKind::Create(_) => AppEvent::FileCreated(path),
                EventKind::Modify(_) => AppEvent::FileModified(path),
                EventKind::Remove(_) => AppEvent::FileDeleted(path),
                _ => continue,
            };

            relevant = true;
            if let Err(e) = self.event_tx.send(app_event) {
                log::warn!("Failed to publish file event: {}", e);
            }
        }

        relevant
    }

    /// Ask the LibraryService for a rescan, fire-and-forget
    fn request_rescan(&self) {
        log::info!("Watched changes settled, requesting library rescan");

        // The reply receiver is dropped on purpose; completion shows up on
        // the event bus as ScanCompleted.
        let (reply, _) = tokio::sync::oneshot::channel();
        if self
            .library_tx
            .send(LibraryCommand::Rescan { reply })
            .is_err()
        {
            log::warn!("Library service unavailable, rescan request dropped");
        }
    }
}

/// Client for interacting with the WatchService
pub struct WatchClient {
    command_tx: crossbeam::channel::Sender<WatchCommand>,
}

impl WatchClient {
    /// Create a new client from a service handle
    pub fn new(handle: &ServiceHandle<WatchCommand>) -> Self {
        Self {
            command_tx: handle.command_tx.clone(),
        }
    }

    /// Start watching a directory (blocking)
    pub fn watch(&self, path: PathBuf) -> Result<(), String> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.command_tx
            .send(WatchCommand::Watch { path, reply: tx })
            .map_err(|e| e.to_string())?;

        rx.blocking_recv().map_err(|e| e.to_string())?
    }

    /// Stop watching a directory (blocking)
    pub fn unwatch(&self, path: PathBuf) -> Result<(), String> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.command_tx
            .send(WatchCommand::Unwatch { path, reply: tx })
            .map_err(|e| e.to_string())?;

        rx.blocking_recv().map_err(|e| e.to_string())?
    }

    /// Shutdown the service
    pub fn shutdown(&self) -> Result<(), String> {
        self.command_tx
            .send(WatchCommand::Shutdown)
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::messages::EventBus;

    fn test_config() -> WatchServiceConfig {
        WatchServiceConfig {
            debounce: Duration::from_millis(200),
            extensions: vec!["mp3".to_string()],
        }
    }

    #[test]
    fn test_watch_service_lifecycle() {
        let bus = EventBus::new(16);
        let (library_tx, _library_rx) = crossbeam::channel::unbounded();

        let handle = WatchService::spawn(test_config(), bus.sender(), library_tx).unwrap();
        let client = WatchClient::new(&handle);

        client.shutdown().unwrap();
        if let Some(h) = handle.thread_handle {
            h.join().unwrap();
        }
    }

    #[test]
    fn test_watch_and_unwatch_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let bus = EventBus::new(16);
        let (library_tx, _library_rx) = crossbeam::channel::unbounded();

        let handle = WatchService::spawn(test_config(), bus.sender(), library_tx).unwrap();
        let client = WatchClient::new(&handle);

        client.watch(temp_dir.path().to_path_buf()).unwrap();
        client.unwatch(temp_dir.path().to_path_buf()).unwrap();

        // Watching a non-directory is rejected
        assert!(client
            .watch(temp_dir.path().join("missing"))
            .is_err());

        client.shutdown().unwrap();
        if let Some(h) = handle.thread_handle {
            h.join().unwrap();
        }
    }
}
