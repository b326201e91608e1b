//! Library scanning
//!
//! Walks the configured library roots and collects a [`TrackMeta`] snapshot
//! for every audio file found. Directory traversal is sequential (so the
//! total is known up front for progress reporting); per-file stat and tag
//! reading run in parallel.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::SystemTime;

use rayon::prelude::*;
use walkdir::WalkDir;

use super::{metadata, TrackMeta};

/// Progress callback for scanning: (files processed, total files)
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send + Sync>;

/// Scan library roots and collect track metadata
///
/// Files that vanish mid-scan or whose tags cannot be read never fail the
/// scan: the former are skipped, the latter enter the result with empty
/// tags. A root that does not exist is skipped with a warning.
pub fn scan_roots(
    roots: &[PathBuf],
    extensions: &[String],
    follow_symlinks: bool,
    progress: Option<ProgressCallback>,
) -> Vec<TrackMeta> {
    // Collect candidate paths first so progress can report a total
    let mut candidates: Vec<(PathBuf, PathBuf)> = Vec::new();
    for root in roots {
        if !root.exists() {
            log::warn!("Library root {:?} does not exist, skipping", root);
            continue;
        }

        for entry in WalkDir::new(root)
            .follow_links(follow_symlinks)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if !has_audio_extension(path, extensions) {
                continue;
            }
            let rel_path = path.strip_prefix(root).unwrap_or(path).to_path_buf();
            candidates.push((path.to_path_buf(), rel_path));
        }
    }

    let total = candidates.len();
    let progress_counter = AtomicUsize::new(0);
    let progress_ref = progress.as_ref();

    let tracks: Vec<Option<TrackMeta>> = candidates
        .into_par_iter()
        .map(|(path, rel_path)| {
            let current = progress_counter.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(cb) = progress_ref {
                cb(current, total);
            }

            let file_meta = match std::fs::metadata(&path) {
                Ok(meta) => meta,
                Err(e) => {
                    // File vanished between walk and stat
                    log::debug!("Failed to stat {:?}: {}", path, e);
                    return None;
                }
            };
            let mtime = file_meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);

            let tags = match metadata::read_tags(&path) {
                Ok(tags) => tags,
                Err(e) => {
                    log::debug!("Failed to read tags from {:?}: {}", path, e);
                    Default::default()
                }
            };

            Some(TrackMeta {
                rel_path,
                path,
                size: file_meta.len(),
                mtime,
                tags,
            })
        })
        .collect();

    tracks.into_iter().flatten().collect()
}

/// Check if a path has one of the configured audio extensions
pub(crate) fn has_audio_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}
