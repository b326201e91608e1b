//! Background services for phono-core
//!
//! Message-driven services that keep scanning and file watching off the
//! caller's thread.
//!
//! # Architecture
//!
//! ```text
//! Caller (UI / CLI)
//!     │ LibraryCommand (request-reply via oneshot)
//!     ▼
//! ┌────────────────┐   rescan requests   ┌──────────────┐
//! │ LibraryService │ ◄────────────────── │ WatchService │
//! │ (index + scan) │                     │   (notify)   │
//! └────────────────┘                     └──────────────┘
//!         │ publish                             │ publish
//!         ▼                                     ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                      Event Bus                       │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! - [`LibraryService`] - owns the library index; scans, reconciles, and
//!   answers queries
//! - [`WatchService`] - monitors library roots and requests a debounced
//!   rescan when audio files change

pub mod library;
pub mod messages;
pub mod watch;

pub use messages::{
    // Commands
    LibraryCommand, WatchCommand,
    // Events
    AppEvent,
    // Infrastructure
    EventBus, ServiceHandle,
};

pub use library::{LibraryClient, LibraryService};
pub use watch::{WatchClient, WatchService, WatchServiceConfig};
