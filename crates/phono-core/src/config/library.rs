//! Library configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths;
use crate::dsp::ReplayGainConfig;

/// Default audio extensions included in library scans
const DEFAULT_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "opus", "m4a", "aac", "wav", "aiff"];

/// Configuration for the local library
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Directories scanned for audio files
    pub roots: Vec<PathBuf>,

    /// File extensions included in scans (case-insensitive)
    pub extensions: Vec<String>,

    /// Follow symlinks while scanning
    /// Default: false (avoids cycles in hand-organized collections)
    pub follow_symlinks: bool,

    /// Watch library roots and rescan automatically after changes settle
    pub watch: bool,

    /// Quiet period in milliseconds before a watched change triggers a rescan
    pub watch_debounce_ms: u64,

    /// Override for the library snapshot location
    /// None uses the platform default under the config directory.
    pub snapshot_path: Option<PathBuf>,

    /// ReplayGain playback settings
    pub replaygain: ReplayGainConfig,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            roots: vec![paths::default_library_root()],
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            follow_symlinks: false,
            watch: true,
            watch_debounce_ms: 2000,
            snapshot_path: None,
            replaygain: ReplayGainConfig::default(),
        }
    }
}

impl LibraryConfig {
    /// Resolve the snapshot file location
    pub fn snapshot_file(&self) -> PathBuf {
        self.snapshot_path
            .clone()
            .unwrap_or_else(paths::default_snapshot_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_config, save_config};

    #[test]
    fn test_default_extensions_cover_common_formats() {
        let config = LibraryConfig::default();
        assert!(config.extensions.iter().any(|e| e == "mp3"));
        assert!(config.extensions.iter().any(|e| e == "flac"));
        assert!(!config.follow_symlinks);
    }

    #[test]
    fn test_snapshot_file_override() {
        let mut config = LibraryConfig::default();
        assert!(config.snapshot_file().ends_with("library-snapshot.yaml"));

        config.snapshot_path = Some(PathBuf::from("/tmp/custom.yaml"));
        assert_eq!(config.snapshot_file(), PathBuf::from("/tmp/custom.yaml"));
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let config = LibraryConfig {
            roots: vec![PathBuf::from("/music")],
            watch: false,
            ..Default::default()
        };
        save_config(&config, &path).unwrap();

        let loaded: LibraryConfig = load_config(&path);
        assert_eq!(loaded.roots, vec![PathBuf::from("/music")]);
        assert!(!loaded.watch);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "watch: false\n").unwrap();

        let loaded: LibraryConfig = load_config(&path);
        assert!(!loaded.watch);
        assert_eq!(loaded.watch_debounce_ms, 2000);
        assert!(!loaded.extensions.is_empty());
    }
}
