//! ReplayGain loudness compensation
//!
//! Applies the gain adjustment carried in a track's ReplayGain tags so that
//! playback loudness stays consistent across a library. Gains are selected
//! per the configured mode (track or album), offset by a preamp, optionally
//! limited to avoid digital clipping using the tagged peak amplitude, and
//! clamped to safety limits.

use serde::{Deserialize, Serialize};

use super::db_to_linear;
use crate::types::StereoBuffer;

/// ReplayGain values read from a track's tags
///
/// All fields are optional: untagged files carry none of them, and many
/// taggers write only the track pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayGainInfo {
    /// Track gain in dB (e.g. -8.5 means the track should be attenuated)
    pub track_gain_db: Option<f32>,
    /// Track peak amplitude, linear scale where 1.0 = full scale
    pub track_peak: Option<f32>,
    /// Album gain in dB
    pub album_gain_db: Option<f32>,
    /// Album peak amplitude
    pub album_peak: Option<f32>,
}

impl ReplayGainInfo {
    /// Check if no ReplayGain tags were present at all
    pub fn is_empty(&self) -> bool {
        self.track_gain_db.is_none()
            && self.track_peak.is_none()
            && self.album_gain_db.is_none()
            && self.album_peak.is_none()
    }
}

/// Which tagged gain to prefer during playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplayGainMode {
    /// No loudness compensation
    Off,
    /// Per-track gain, so every track plays at the same loudness
    #[default]
    Track,
    /// Album gain, preserving intentional loudness differences within an album
    Album,
}

/// ReplayGain processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayGainConfig {
    /// Gain selection mode
    pub mode: ReplayGainMode,

    /// Extra gain in dB applied on top of the tagged gain
    /// Default: 0.0 dB
    pub preamp_db: f32,

    /// Gain in dB applied to tracks that carry no ReplayGain tags
    /// Default: 0.0 dB
    pub fallback_gain_db: f32,

    /// Limit the gain so the tagged peak cannot exceed full scale
    /// Default: true
    pub prevent_clipping: bool,

    /// Maximum boost in dB (safety limit for extreme tag values)
    /// Default: 12.0 dB
    pub max_gain_db: f32,

    /// Maximum cut in dB
    /// Default: -24.0 dB
    pub min_gain_db: f32,
}

impl Default for ReplayGainConfig {
    fn default() -> Self {
        Self {
            mode: ReplayGainMode::Track,
            preamp_db: 0.0,
            fallback_gain_db: 0.0,
            prevent_clipping: true,
            max_gain_db: 12.0,
            min_gain_db: -24.0,
        }
    }
}

impl ReplayGainConfig {
    /// Calculate the gain adjustment in dB for a track
    ///
    /// Falls back to the other gain pair when the preferred one is untagged
    /// (track mode uses the album gain if only that is present, and vice
    /// versa). Returns 0.0 when the mode is [`ReplayGainMode::Off`].
    pub fn gain_db(&self, info: &ReplayGainInfo) -> f32 {
        let selected = match self.mode {
            ReplayGainMode::Off => return 0.0,
            ReplayGainMode::Track => info.track_gain_db.or(info.album_gain_db),
            ReplayGainMode::Album => info.album_gain_db.or(info.track_gain_db),
        };

        let db = match selected {
            Some(gain) => gain + self.preamp_db,
            None => self.fallback_gain_db,
        };
        db.clamp(self.min_gain_db, self.max_gain_db)
    }

    /// Calculate the linear gain factor for a track
    ///
    /// When clipping prevention is enabled and a peak tag is available, the
    /// factor is limited so that `peak * factor <= 1.0`.
    pub fn gain_factor(&self, info: &ReplayGainInfo) -> f32 {
        let mut factor = db_to_linear(self.gain_db(info));

        if self.prevent_clipping {
            let peak = match self.mode {
                ReplayGainMode::Off => None,
                ReplayGainMode::Track => info.track_peak.or(info.album_peak),
                ReplayGainMode::Album => info.album_peak.or(info.track_peak),
            };
            if let Some(peak) = peak {
                if peak > 0.0 {
                    factor = factor.min(1.0 / peak);
                }
            }
        }

        factor
    }

    /// Scale a buffer in place by the computed gain factor
    pub fn apply(&self, info: &ReplayGainInfo, buffer: &mut StereoBuffer) {
        let factor = self.gain_factor(info);
        if (factor - 1.0).abs() > f32::EPSILON {
            buffer.scale(factor);
        }
    }
}
