//! Search and statistics over a catalog snapshot
//!
//! Everything here is a pure function of the tracks passed in, in catalog
//! insertion order. Nothing is cached between calls.

use trackvault_core::{
    error::{Result, VaultError},
    types::{LibraryStats, TopTrack, Track},
};

/// Default size of the top-N ranking
pub const DEFAULT_TOP_N: usize = 10;

/// Case-insensitive substring match on title or artist
///
/// The query is trimmed first; an empty query is rejected. Results keep
/// the iteration order of `tracks`.
pub fn search<'a, I>(tracks: I, query: &str) -> Result<Vec<Track>>
where
    I: IntoIterator<Item = &'a Track>,
{
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Err(VaultError::invalid_query("query must not be empty"));
    }

    Ok(tracks
        .into_iter()
        .filter(|track| {
            track.title.to_lowercase().contains(&needle)
                || track.artist.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect())
}

/// Totals and the `top_n` most played tracks
///
/// Ties in play count keep insertion order.
pub fn stats<'a, I>(tracks: I, top_n: usize) -> LibraryStats
where
    I: IntoIterator<Item = &'a Track>,
{
    let mut ranked: Vec<&Track> = tracks.into_iter().collect();
    let total_tracks = ranked.len();
    let total_plays = ranked.iter().map(|t| t.play_count).sum();

    // Stable sort
    ranked.sort_by(|a, b| b.play_count.cmp(&a.play_count));

    LibraryStats {
        total_tracks,
        total_plays,
        top_tracks: ranked.into_iter().take(top_n).map(TopTrack::from).collect(),
    }
}

/// The `n` most recently created tracks, newest first
///
/// Tracks created at the same instant are ordered by later insertion first.
pub fn recent<'a, I>(tracks: I, n: usize) -> Vec<Track>
where
    I: IntoIterator<Item = &'a Track>,
    I::IntoIter: DoubleEndedIterator,
{
    let mut newest: Vec<&Track> = tracks.into_iter().rev().collect();
    newest.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    newest.into_iter().take(n).cloned().collect()
}
