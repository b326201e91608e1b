//! Tag metadata extraction
//!
//! Probes audio files with symphonia and pulls out the display tags,
//! duration, and ReplayGain values the library cares about. Probing never
//! decodes audio; it only reads container headers and metadata blocks.

use std::path::Path;

use serde::{Deserialize, Serialize};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::{MetadataOptions, MetadataRevision, StandardTagKey};
use symphonia::core::probe::Hint;

use super::LibraryError;
use crate::dsp::ReplayGainInfo;

/// Tag metadata for a track
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackTags {
    /// Track title
    pub title: Option<String>,
    /// Artist (album artist when no track artist is tagged)
    pub artist: Option<String>,
    /// Album name
    pub album: Option<String>,
    /// Duration in seconds, derived from the codec parameters
    pub duration_secs: Option<f64>,
    /// ReplayGain values for loudness compensation
    pub replaygain: ReplayGainInfo,
}

/// Read tag metadata from an audio file
///
/// Returns [`LibraryError::Probe`] for files symphonia cannot identify;
/// callers typically degrade to empty tags rather than failing a scan.
pub fn read_tags(path: &Path) -> Result<TrackTags, LibraryError> {
    let file = std::fs::File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let mut probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| LibraryError::Probe(e.to_string()))?;

    let mut tags = TrackTags::default();

    // Tags found while probing the container (e.g. ID3v2) take precedence
    // over format-level metadata; collect_tags only fills empty fields.
    if let Some(metadata) = probed.metadata.get() {
        if let Some(rev) = metadata.current() {
            collect_tags(rev, &mut tags);
        }
    }
    if let Some(rev) = probed.format.metadata().current() {
        collect_tags(rev, &mut tags);
    }

    if let Some(track) = probed.format.default_track() {
        let params = &track.codec_params;
        if let (Some(frames), Some(rate)) = (params.n_frames, params.sample_rate) {
            tags.duration_secs = Some(frames as f64 / rate as f64);
        }
    }

    Ok(tags)
}

fn collect_tags(rev: &MetadataRevision, tags: &mut TrackTags) {
    for tag in rev.tags() {
        let Some(key) = tag.std_key else { continue };
        match key {
            StandardTagKey::TrackTitle => fill_text(&mut tags.title, &tag.value.to_string()),
            StandardTagKey::Artist | StandardTagKey::AlbumArtist => {
                fill_text(&mut tags.artist, &tag.value.to_string())
            }
            StandardTagKey::Album => fill_text(&mut tags.album, &tag.value.to_string()),
            StandardTagKey::ReplayGainTrackGain => {
                fill_value(
                    &mut tags.replaygain.track_gain_db,
                    parse_gain_db(&tag.value.to_string()),
                );
            }
            StandardTagKey::ReplayGainTrackPeak => {
                fill_value(
                    &mut tags.replaygain.track_peak,
                    parse_peak(&tag.value.to_string()),
                );
            }
            StandardTagKey::ReplayGainAlbumGain => {
                fill_value(
                    &mut tags.replaygain.album_gain_db,
                    parse_gain_db(&tag.value.to_string()),
                );
            }
            StandardTagKey::ReplayGainAlbumPeak => {
                fill_value(
                    &mut tags.replaygain.album_peak,
                    parse_peak(&tag.value.to_string()),
                );
            }
            _ => {}
        }
    }
}

fn fill_text(slot: &mut Option<String>, value: &str) {
    let trimmed = value.trim();
    if slot.is_none() && !trimmed.is_empty() {
        *slot = Some(trimmed.to_string());
    }
}

fn fill_value(slot: &mut Option<f32>, value: Option<f32>) {
    if slot.is_none() {
        *slot = value;
    }
}

/// Parse a ReplayGain gain tag value like "-8.97 dB" or "+2.3"
fn parse_gain_db(value: &str) -> Option<f32> {
    let trimmed = value.trim();
    let trimmed = trimmed
        .strip_suffix("dB")
        .or_else(|| trimmed.strip_suffix("DB"))
        .or_else(|| trimmed.strip_suffix("db"))
        .unwrap_or(trimmed);
    trimmed.trim().parse::<f32>().ok()
}

/// Parse a ReplayGain peak tag value (linear amplitude, non-negative)
fn parse_peak(value: &str) -> Option<f32> {
    value.trim().parse::<f32>().ok().filter(|p| *p >= 0.0)
}
