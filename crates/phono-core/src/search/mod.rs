//! Fuzzy track search
//!
//! Jaro-Winkler string similarity plus a ranking helper that scores library
//! tracks against a query by the best of their title / artist / album
//! fields. Similarity is tolerant of typos and partial matches, which suits
//! search-as-you-type over tag data of wildly varying quality.

use std::cmp::Ordering;

use crate::library::TrackMeta;

/// Winkler prefix bonus scaling factor
const WINKLER_PREFIX_SCALE: f64 = 0.1;

/// Maximum common-prefix length considered for the Winkler bonus
const WINKLER_MAX_PREFIX: usize = 4;

/// Jaro similarity between two strings, in [0, 1]
///
/// 1.0 means identical; 0.0 means no characters in common. Two empty
/// strings count as identical.
pub fn jaro(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    // Characters match if equal and within half the longer length of each other
    let window = (a.len().max(b.len()) / 2).saturating_sub(1);
    let mut a_matched = vec![false; a.len()];
    let mut b_matched = vec![false; b.len()];
    let mut matches = 0usize;

    for (i, ca) in a.iter().enumerate() {
        let lo = i.saturating_sub(window);
        let hi = (i + window + 1).min(b.len());
        for j in lo..hi {
            if !b_matched[j] && b[j] == *ca {
                a_matched[i] = true;
                b_matched[j] = true;
                matches += 1;
                break;
            }
        }
    }

    if matches == 0 {
        return 0.0;
    }

    // Transpositions: matched characters that line up in a different order
    let mut transposed = 0usize;
    let mut j = 0usize;
    for (i, matched) in a_matched.iter().enumerate() {
        if !matched {
            continue;
        }
        while !b_matched[j] {
            j += 1;
        }
        if a[i] != b[j] {
            transposed += 1;
        }
        j += 1;
    }

    let m = matches as f64;
    (m / a.len() as f64 + m / b.len() as f64 + (m - (transposed / 2) as f64) / m) / 3.0
}

/// Jaro-Winkler similarity between two strings, in [0, 1]
///
/// Like [`jaro`] but with a bonus for a shared prefix (up to 4 characters),
/// which favors matches that start the same way - the common case when the
/// user is typing the beginning of a title or artist name.
pub fn jaro_winkler(a: &str, b: &str) -> f64 {
    let j = jaro(a, b);
    let prefix = a
        .chars()
        .zip(b.chars())
        .take(WINKLER_MAX_PREFIX)
        .take_while(|(x, y)| x == y)
        .count();
    j + prefix as f64 * WINKLER_PREFIX_SCALE * (1.0 - j)
}

/// Case-insensitive Jaro-Winkler similarity
pub fn similarity(query: &str, candidate: &str) -> f64 {
    jaro_winkler(&query.to_lowercase(), &candidate.to_lowercase())
}

/// A track matched by a fuzzy search, with its score (higher = better)
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub track: TrackMeta,
    pub score: f64,
}

/// Score a track against a query: the best similarity across its title,
/// artist, and album fields
pub fn score_track(query: &str, track: &TrackMeta) -> f64 {
    let mut best = similarity(query, &track.display_title());
    if let Some(artist) = &track.tags.artist {
        best = best.max(similarity(query, artist));
    }
    if let Some(album) = &track.tags.album {
        best = best.max(similarity(query, album));
    }
    best
}

/// Rank tracks against a query, best first
///
/// Tracks scoring below `min_score` are dropped; at most `limit` hits are
/// returned.
pub fn rank_tracks<'a>(
    query: &str,
    tracks: impl IntoIterator<Item = &'a TrackMeta>,
    min_score: f64,
    limit: usize,
) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = tracks
        .into_iter()
        .map(|track| SearchHit {
            score: score_track(query, track),
            track: track.clone(),
        })
        .filter(|hit| hit.score >= min_score)
        .collect();

    hits.sort_by(|x, y| y.score.partial_cmp(&x.score).unwrap_or(Ordering::Equal));
    hits.truncate(limit);
    hits
}
