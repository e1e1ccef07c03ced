//! API routes.

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::annotations::{get_annotation, save_annotation};
use crate::handlers::frames::get_frame;
use crate::handlers::health::health;
use crate::handlers::videos::{get_frame_sequence, list_videos};
use crate::middleware::{cors_layer, request_id, request_logging, security_headers};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/videos", get(list_videos))
        .route("/video/:video_id/frames", get(get_frame_sequence))
        .route(
            "/annotation/:video_id",
            get(get_annotation).post(save_annotation),
        );

    Router::new()
        .nest("/api", api_routes)
        .route("/frames/:video_id/:frame_id", get(get_frame))
        .route("/health", get(health))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
