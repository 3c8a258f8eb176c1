use axum::Json;
use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::Segment;
use crate::presentation::state::AppState;

use super::error_response::store_error_response;
use super::resolve_audio_ref;

#[derive(Serialize)]
pub struct UpdateResponse {
    pub message: String,
}

#[derive(Deserialize)]
pub struct UpdateTranscriptRequest {
    pub transcript: Vec<Segment>,
}

#[derive(Deserialize)]
pub struct AppendAnnotationRequest {
    pub annotation: Value,
}

/// The raw sidecar document for a recording, unknown keys included.
#[tracing::instrument(skip(state))]
pub async fn get_record_handler(
    State(state): State<AppState>,
    UrlPath(path): UrlPath<String>,
) -> impl IntoResponse {
    let audio = match resolve_audio_ref(&state, &path) {
        Ok(a) => a,
        Err(response) => return response,
    };

    match state.record_store.read_document(&audio).await {
        Ok(doc) => (StatusCode::OK, Json(doc)).into_response(),
        Err(e) => store_error_response(e),
    }
}

/// Replaces the record's transcript as a whole; every other field is
/// preserved. Never creates a record.
#[tracing::instrument(skip(state, body))]
pub async fn update_transcript_handler(
    State(state): State<AppState>,
    UrlPath(path): UrlPath<String>,
    Json(body): Json<UpdateTranscriptRequest>,
) -> impl IntoResponse {
    let audio = match resolve_audio_ref(&state, &path) {
        Ok(a) => a,
        Err(response) => return response,
    };

    match state
        .record_store
        .update_transcript(&audio, &body.transcript)
        .await
    {
        Ok(()) => {
            tracing::info!(file = %path, segments = body.transcript.len(), "Transcript updated");
            (
                StatusCode::OK,
                Json(UpdateResponse {
                    message: "Transcript updated successfully".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => store_error_response(e),
    }
}

/// Appends one annotation to the record. Annotations are opaque values in
/// an append-only sequence.
#[tracing::instrument(skip(state, body))]
pub async fn append_annotation_handler(
    State(state): State<AppState>,
    UrlPath(path): UrlPath<String>,
    Json(body): Json<AppendAnnotationRequest>,
) -> impl IntoResponse {
    let audio = match resolve_audio_ref(&state, &path) {
        Ok(a) => a,
        Err(response) => return response,
    };

    match state
        .record_store
        .append_annotation(&audio, body.annotation)
        .await
    {
        Ok(()) => {
            tracing::info!(file = %path, "Annotation appended");
            (
                StatusCode::OK,
                Json(UpdateResponse {
                    message: "Annotation added successfully".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => store_error_response(e),
    }
}
