//! M3U playlist parsing and writing
//!
//! Handles plain and extended M3U (`.m3u` / `.m3u8`; both are parsed the
//! same way, the latter just promises UTF-8). The format is line-oriented:
//!
//! ```text
//! #EXTM3U
//! #EXTINF:213,Some Artist - Some Title
//! Music/Some Artist/Some Title.mp3
//! ```
//!
//! The parser is deliberately lenient: unknown `#` directives are skipped,
//! a malformed `#EXTINF` duration degrades to "unknown", and a dangling
//! `#EXTINF` with no following path line is dropped.

use std::path::Path;

use super::{Playlist, PlaylistEntry, PlaylistError};

/// Parse M3U content into playlist entries
///
/// Relative entry paths are resolved against `base_dir` (normally the
/// directory containing the playlist file).
pub fn parse_m3u(content: &str, base_dir: &Path) -> Vec<PlaylistEntry> {
    let mut entries = Vec::new();
    // Duration and title from the most recent #EXTINF, carried onto the
    // next path line
    let mut pending: Option<(Option<f64>, Option<String>)> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("#EXTINF:") {
            pending = Some(parse_extinf(rest));
        } else if line.starts_with('#') {
            // #EXTM3U header, comments, and directives we don't use
            continue;
        } else {
            let raw = Path::new(line);
            let path = if raw.is_absolute() {
                raw.to_path_buf()
            } else {
                base_dir.join(raw)
            };
            let (duration_secs, title) = pending.take().unwrap_or((None, None));
            entries.push(PlaylistEntry {
                path,
                duration_secs,
                title,
            });
        }
    }

    entries
}

/// Parse the body of an #EXTINF line: "<duration>,<display title>"
///
/// Duration is seconds; -1 (or anything unparseable) means unknown.
fn parse_extinf(rest: &str) -> (Option<f64>, Option<String>) {
    let (duration_part, title_part) = match rest.split_once(',') {
        Some((d, t)) => (d, Some(t)),
        None => (rest, None),
    };

    let duration = duration_part
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|d| *d >= 0.0);

    let title = title_part
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    (duration, title)
}

/// Read a playlist from an M3U file
///
/// The playlist name is the file stem; relative entries resolve against the
/// file's directory.
pub fn read_m3u(path: &Path) -> Result<Playlist, PlaylistError> {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .ok_or_else(|| PlaylistError::InvalidPath(path.to_path_buf()))?;

    let content = std::fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

    Ok(Playlist {
        name,
        entries: parse_m3u(&content, base_dir),
    })
}

/// Write a playlist as extended M3U
pub fn write_m3u(playlist: &Playlist, path: &Path) -> Result<(), PlaylistError> {
    let mut out = String::from("#EXTM3U\n");

    for entry in &playlist.entries {
        if entry.duration_secs.is_some() || entry.title.is_some() {
            let duration = entry
                .duration_secs
                .map(|d| d.round() as i64)
                .unwrap_or(-1);
            let title = entry.title.as_deref().unwrap_or("");
            out.push_str(&format!("#EXTINF:{},{}\n", duration, title));
        }
        out.push_str(&format!("{}\n", entry.path.display()));
    }

    std::fs::write(path, out)?;
    log::debug!(
        "Wrote playlist '{}' ({} entries) to {:?}",
        playlist.name,
        playlist.len(),
        path
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_plain_m3u() {
        let content = "a.mp3\nsub/b.mp3\n/abs/c.mp3\n";
        let entries = parse_m3u(content, Path::new("/music"));

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].path, PathBuf::from("/music/a.mp3"));
        assert_eq!(entries[1].path, PathBuf::from("/music/sub/b.mp3"));
        assert_eq!(entries[2].path, PathBuf::from("/abs/c.mp3"));
        assert_eq!(entries[0].title, None);
        assert_eq!(entries[0].duration_secs, None);
    }

    #[test]
    fn test_parse_extended_m3u() {
        let content = "\
#EXTM3U
#EXTINF:213,Some Artist - Some Title
Some Artist/Some Title.mp3

# a comment
#EXTINF:-1,Unknown Length
stream.mp3
";
        let entries = parse_m3u(content, Path::new("/music"));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].duration_secs, Some(213.0));
        assert_eq!(entries[0].title.as_deref(), Some("Some Artist - Some Title"));
        assert_eq!(
            entries[0].path,
            PathBuf::from("/music/Some Artist/Some Title.mp3")
        );
        // -1 duration means unknown
        assert_eq!(entries[1].duration_secs, None);
        assert_eq!(entries[1].title.as_deref(), Some("Unknown Length"));
    }

    #[test]
    fn test_extinf_applies_only_to_next_entry() {
        let content = "#EXTINF:100,Titled\na.mp3\nb.mp3\n";
        let entries = parse_m3u(content, Path::new(""));

        assert_eq!(entries[0].title.as_deref(), Some("Titled"));
        assert_eq!(entries[1].title, None);
    }

    #[test]
    fn test_dangling_extinf_is_dropped() {
        let content = "a.mp3\n#EXTINF:100,No Path Follows\n";
        let entries = parse_m3u(content, Path::new(""));
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_malformed_extinf_degrades() {
        let content = "#EXTINF:soon,Still A Title\na.mp3\n#EXTINF:42\nb.mp3\n";
        let entries = parse_m3u(content, Path::new(""));

        assert_eq!(entries[0].duration_secs, None);
        assert_eq!(entries[0].title.as_deref(), Some("Still A Title"));
        assert_eq!(entries[1].duration_secs, Some(42.0));
        assert_eq!(entries[1].title, None);
    }

    #[test]
    fn test_fractional_duration() {
        let content = "#EXTINF:187.5,T\na.mp3\n";
        let entries = parse_m3u(content, Path::new(""));
        assert_eq!(entries[0].duration_secs, Some(187.5));
    }

    #[test]
    fn test_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Warmup Set.m3u");

        let playlist = Playlist {
            name: "Warmup Set".to_string(),
            entries: vec![
                PlaylistEntry {
                    path: PathBuf::from("/music/a.mp3"),
                    duration_secs: Some(213.0),
                    title: Some("Artist - A".to_string()),
                },
                PlaylistEntry {
                    path: PathBuf::from("/music/b.mp3"),
                    duration_secs: None,
                    title: None,
                },
            ],
        };

        write_m3u(&playlist, &path).unwrap();
        let loaded = read_m3u(&path).unwrap();

        assert_eq!(loaded.name, "Warmup Set");
        assert_eq!(loaded, playlist);
    }

    #[test]
    fn test_read_relative_entries_resolve_against_playlist_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mix.m3u");
        std::fs::write(&path, "tracks/a.mp3\n").unwrap();

        let playlist = read_m3u(&path).unwrap();
        assert_eq!(playlist.entries[0].path, dir.path().join("tracks/a.mp3"));
    }
}
