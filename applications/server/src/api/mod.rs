/// API route modules
pub mod health;
pub mod ingest;
pub mod stats;
pub mod stream;
pub mod tracks;

use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the full HTTP router
pub fn router(app_state: AppState) -> Router {
    let max_concurrent = app_state.config.server.max_concurrent_requests;

    let api_routes = Router::new()
        .route("/tracks", get(tracks::list_tracks))
        .route("/search", get(tracks::search_tracks))
        .route(
            "/track/:id",
            get(tracks::get_track).delete(tracks::delete_track),
        )
        .route("/play/:id", get(stream::play_track))
        .route("/download/:id", get(stream::download_track))
        .route("/stats", get(stats::library_stats))
        // Upload size is enforced while the body streams in
        .route(
            "/ingest",
            post(ingest::ingest_track).layer(DefaultBodyLimit::disable()),
        );

    Router::new()
        .route("/", get(health::index))
        .route("/health", get(health::health))
        .nest("/api", api_routes)
        .layer(GlobalConcurrencyLimitLayer::new(max_concurrent))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
