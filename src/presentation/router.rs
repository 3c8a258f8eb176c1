use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    append_annotation_handler, get_record_handler, health_handler, list_audio_handler,
    stream_audio_handler, update_transcript_handler,
};
use crate::presentation::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Wildcard segments must be terminal, so transcript replacement and
    // annotation appends get their own prefixes instead of a suffix after
    // the record path.
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/audio", get(list_audio_handler))
        .route("/api/v1/audio/{*path}", get(stream_audio_handler))
        .route("/api/v1/records/{*path}", get(get_record_handler))
        .route("/api/v1/transcripts/{*path}", put(update_transcript_handler))
        .route("/api/v1/annotations/{*path}", post(append_annotation_handler))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
