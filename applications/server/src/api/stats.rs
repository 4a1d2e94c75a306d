/// Library statistics route
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use trackvault_core::types::LibraryStats;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    /// Number of most played tracks to include
    #[serde(default)]
    pub top: Option<usize>,
}

/// GET /api/stats
pub async fn library_stats(
    State(app_state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Json<LibraryStats> {
    let top_n = query.top.unwrap_or(app_state.config.stats.top_n);
    Json(app_state.gateway.stats(top_n).await)
}
