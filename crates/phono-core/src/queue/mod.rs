//! Playback queue management
//!
//! An ordered list of tracks plus a play position, with repeat and shuffle
//! behavior. Shuffle keeps the underlying track list intact and permutes a
//! separate play order, so toggling shuffle off restores the original
//! sequence. Pure in-memory state; playback transport lives elsewhere.

use rand::seq::SliceRandom;

use crate::library::TrackMeta;

/// Repeat behavior when the queue reaches its end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatMode {
    /// Stop after the last track
    #[default]
    Off,
    /// Wrap back to the first track
    All,
    /// Repeat the current track on auto-advance
    One,
}

/// Playback queue with repeat and shuffle
#[derive(Debug, Default)]
pub struct PlayQueue {
    /// Tracks in insertion order
    tracks: Vec<TrackMeta>,
    /// Play order: indices into `tracks` (identity unless shuffled)
    order: Vec<usize>,
    /// Current position as an index into `order`
    position: Option<usize>,
    repeat: RepeatMode,
    shuffled: bool,
}

impl PlayQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracks in the queue
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// The track at the current position, if any
    pub fn current(&self) -> Option<&TrackMeta> {
        self.position
            .and_then(|p| self.order.get(p))
            .and_then(|&i| self.tracks.get(i))
    }

    /// Current repeat mode
    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    /// Set the repeat mode
    pub fn set_repeat(&mut self, mode: RepeatMode) {
        self.repeat = mode;
    }

    /// Whether shuffle is active
    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    /// Tracks in play order
    pub fn play_order(&self) -> impl Iterator<Item = &TrackMeta> {
        self.order.iter().map(move |&i| &self.tracks[i])
    }

    /// Replace the queue contents and clear the position
    pub fn replace(&mut self, tracks: Vec<TrackMeta>) {
        self.tracks = tracks;
        self.order = (0..self.tracks.len()).collect();
        self.position = None;
        if self.shuffled {
            self.shuffle_order();
        }
    }

    /// Append tracks to the end of the queue
    pub fn append(&mut self, tracks: Vec<TrackMeta>) {
        let start = self.tracks.len();
        self.tracks.extend(tracks);
        self.order.extend(start..self.tracks.len());
    }

    /// Insert a track directly after the current position
    ///
    /// With no current position the track plays first.
    pub fn enqueue_next(&mut self, track: TrackMeta) {
        let track_index = self.tracks.len();
        self.tracks.push(track);
        let at = self.position.map(|p| p + 1).unwrap_or(0);
        self.order.insert(at.min(self.order.len()), track_index);
    }

    /// Jump to a position in the play order and return that track
    pub fn jump_to(&mut self, order_index: usize) -> Option<&TrackMeta> {
        if order_index >= self.order.len() {
            return None;
        }
        self.position = Some(order_index);
        self.current()
    }

    /// Remove the track at a play-order position
    ///
    /// The current position is adjusted so the currently playing track keeps
    /// playing; removing the current track leaves the position pointing at
    /// the next track in order.
    pub fn remove(&mut self, order_index: usize) -> Option<TrackMeta> {
        if order_index >= self.order.len() {
            return None;
        }

        let track_index = self.order.remove(order_index);
        let removed = self.tracks.remove(track_index);

        // Order entries past the removed track shift down by one
        for entry in &mut self.order {
            if *entry > track_index {
                *entry -= 1;
            }
        }

        self.position = match self.position {
            Some(p) if p > order_index => Some(p - 1),
            Some(p) if p == order_index => {
                if self.order.is_empty() {
                    None
                } else {
                    Some(p.min(self.order.len() - 1))
                }
            }
            other => other,
        };

        Some(removed)
    }

    /// Auto-advance to the next track (track finished playing)
    ///
    /// Honors the repeat mode: `One` stays on the current track, `All` wraps
    /// at the end, `Off` returns None when the queue is exhausted.
    pub fn advance(&mut self) -> Option<&TrackMeta> {
        if self.order.is_empty() {
            return None;
        }

        if self.repeat == RepeatMode::One {
            if self.position.is_none() {
                self.position = Some(0);
            }
            return self.current();
        }

        let next = self.position.map(|p| p + 1).unwrap_or(0);
        if next >= self.order.len() {
            if self.repeat == RepeatMode::All {
                self.position = Some(0);
            } else {
                return None;
            }
        } else {
            self.position = Some(next);
        }
        self.current()
    }

    /// Skip forward (user pressed next)
    ///
    /// Unlike [`advance`](Self::advance), repeat-one does not pin the
    /// current track; skipping always moves, wrapping unless repeat is off.
    pub fn skip_next(&mut self) -> Option<&TrackMeta> {
        if self.order.is_empty() {
            return None;
        }

        let next = self.position.map(|p| p + 1).unwrap_or(0);
        if next >= self.order.len() {
            if self.repeat == RepeatMode::Off {
                return None;
            }
            self.position = Some(0);
        } else {
            self.position = Some(next);
        }
        self.current()
    }

    /// Skip backward (user pressed previous)
    pub fn skip_previous(&mut self) -> Option<&TrackMeta> {
        if self.order.is_empty() {
            return None;
        }

        match self.position {
            None | Some(0) => {
                if self.repeat == RepeatMode::Off {
                    return None;
                }
                self.position = Some(self.order.len() - 1);
            }
            Some(p) => self.position = Some(p - 1),
        }
        self.current()
    }

    /// Toggle shuffle
    ///
    /// Turning shuffle on randomizes the play order with the current track
    /// first; turning it off restores insertion order, keeping the current
    /// track current.
    pub fn set_shuffle(&mut self, enabled: bool) {
        if enabled == self.shuffled {
            return;
        }
        self.shuffled = enabled;

        let current = self.position.and_then(|p| self.order.get(p).copied());
        if enabled {
            self.shuffle_order();
        } else {
            self.order = (0..self.tracks.len()).collect();
            // Insertion order means play-order index == track index
            self.position = current;
        }
    }

    /// Randomize the play order, keeping the current track first
    fn shuffle_order(&mut self) {
        let current = self.position.and_then(|p| self.order.get(p).copied());

        let mut rest: Vec<usize> = (0..self.tracks.len())
            .filter(|i| Some(*i) != current)
            .collect();
        rest.shuffle(&mut rand::thread_rng());

        match current {
            Some(c) => {
                self.order = Vec::with_capacity(self.tracks.len());
                self.order.push(c);
                self.order.extend(rest);
                self.position = Some(0);
            }
            None => {
                self.order = rest;
                self.position = None;
            }
        }
    }
}
