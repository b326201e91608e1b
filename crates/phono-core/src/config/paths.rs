//! Default paths for phono files

use std::path::PathBuf;

/// Get the default library root
///
/// Returns the platform music directory (`~/Music` on most systems), or the
/// home directory when the platform has no music directory configured.
pub fn default_library_root() -> PathBuf {
    dirs::audio_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the default config file path
///
/// Returns: `<config dir>/phono/config.yaml`
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

/// Get the default library snapshot path
///
/// Returns: `<config dir>/phono/library-snapshot.yaml`
pub fn default_snapshot_path() -> PathBuf {
    config_dir().join("library-snapshot.yaml")
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("phono")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_ends_with_filename() {
        assert!(default_config_path().ends_with("phono/config.yaml"));
    }

    #[test]
    fn test_snapshot_path_ends_with_filename() {
        assert!(default_snapshot_path().ends_with("phono/library-snapshot.yaml"));
    }
}
