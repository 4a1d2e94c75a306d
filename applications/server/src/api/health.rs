/// Health and service summary routes
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub tracks: usize,
    /// True while play counts or deletions exist only in memory
    pub degraded: bool,
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub name: String,
    pub version: String,
    pub tracks: usize,
    pub endpoints: Vec<&'static str>,
}

const ENDPOINTS: &[&str] = &[
    "GET /health",
    "GET /api/tracks",
    "GET /api/search?q=",
    "GET /api/track/:id",
    "DELETE /api/track/:id",
    "GET /api/play/:id",
    "GET /api/download/:id",
    "GET /api/stats",
    "POST /api/ingest",
];

/// GET /health - Health check endpoint
pub async fn health(State(app_state): State<AppState>) -> Json<HealthResponse> {
    let degraded = app_state.catalog.is_degraded();
    Json(HealthResponse {
        status: if degraded { "degraded" } else { "ok" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        tracks: app_state.catalog.len().await,
        degraded,
    })
}

/// GET / - Service summary
pub async fn index(State(app_state): State<AppState>) -> Json<IndexResponse> {
    Json(IndexResponse {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        tracks: app_state.catalog.len().await,
        endpoints: ENDPOINTS.to_vec(),
    })
}
