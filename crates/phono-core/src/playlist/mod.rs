//! Playlist file support
//!
//! Playlists are plain M3U files on disk: an ordered list of track paths,
//! optionally annotated with extended-M3U duration and display-title lines.
//! Entries keep their file order; resolving whether the referenced files
//! still exist is the library's job, not the parser's.

pub mod m3u;

pub use m3u::{parse_m3u, read_m3u, write_m3u};

use std::path::PathBuf;

/// A single entry in a playlist
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistEntry {
    /// Path to the audio file (absolute after parsing; relative entries are
    /// resolved against the playlist's directory)
    pub path: PathBuf,
    /// Duration in seconds from the #EXTINF line, if present
    pub duration_secs: Option<f64>,
    /// Display title from the #EXTINF line, if present
    pub title: Option<String>,
}

/// An ordered playlist
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Playlist {
    /// Display name (the file stem for playlists read from disk)
    pub name: String,
    /// Entries in file order
    pub entries: Vec<PlaylistEntry>,
}

impl Playlist {
    /// Create an empty playlist with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the playlist has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Errors that can occur during playlist operations
#[derive(Debug)]
pub enum PlaylistError {
    /// IO error reading or writing the playlist file
    Io(std::io::Error),
    /// The playlist path has no usable file name
    InvalidPath(PathBuf),
}

impl std::fmt::Display for PlaylistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaylistError::Io(e) => write!(f, "IO error: {}", e),
            PlaylistError::InvalidPath(path) => write!(f, "Invalid playlist path: {:?}", path),
        }
    }
}

impl std::error::Error for PlaylistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlaylistError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PlaylistError {
    fn from(e: std::io::Error) -> Self {
        PlaylistError::Io(e)
    }
}
