/// Aggregate library statistics
use super::ids::TrackId;
use super::track::Track;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryStats {
    pub total_tracks: usize,
    pub total_plays: u64,
    pub top_tracks: Vec<TopTrack>,
}

/// Entry in a top-N ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopTrack {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    pub play_count: u64,
}

impl From<&Track> for TopTrack {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            play_count: track.play_count,
        }
    }
}
