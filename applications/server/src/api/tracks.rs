/// Track listing, lookup and removal routes
use crate::{error::Result, state::AppState};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use trackvault_core::{
    error::VaultError,
    types::{PublicTrack, TrackId},
};

#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
    /// Return the N most recently added tracks instead of the full list
    #[serde(default)]
    pub recent: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TracksResponse {
    pub tracks: Vec<PublicTrack>,
    pub count: usize,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub tracks: Vec<PublicTrack>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub id: TrackId,
}

/// GET /api/tracks
pub async fn list_tracks(
    State(app_state): State<AppState>,
    Query(query): Query<TrackQuery>,
) -> Json<TracksResponse> {
    let tracks = match query.recent {
        Some(n) => app_state.gateway.recent(n).await,
        None => app_state.gateway.list_public().await,
    };

    // Simple pagination
    let total = tracks.len();
    let paginated: Vec<PublicTrack> = tracks
        .into_iter()
        .skip(query.offset)
        .take(query.limit.unwrap_or(usize::MAX))
        .collect();

    Json(TracksResponse {
        count: paginated.len(),
        tracks: paginated,
        total,
    })
}

/// GET /api/search?q=
pub async fn search_tracks(
    State(app_state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>> {
    let q = query.q.unwrap_or_default();
    let tracks = app_state.gateway.search(&q).await?;

    Ok(Json(SearchResponse {
        query: q.trim().to_string(),
        count: tracks.len(),
        tracks,
    }))
}

/// GET /api/track/:id
pub async fn get_track(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<PublicTrack>> {
    let track = app_state.gateway.track_info(&TrackId::new(id)).await?;
    Ok(Json(track))
}

/// DELETE /api/track/:id
pub async fn delete_track(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<DeleteResponse>> {
    let track_id = TrackId::new(id);
    if !app_state.catalog.delete(&track_id).await? {
        return Err(VaultError::NotFound(track_id).into());
    }

    Ok(Json(DeleteResponse {
        success: true,
        id: track_id,
    }))
}
