use axum::Json;
use axum::body::Body;
use axum::extract::{Path as UrlPath, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use serde::Serialize;
use tokio_util::io::ReaderStream;
use walkdir::WalkDir;

use crate::presentation::state::AppState;

use super::error_response::error_response;
use super::resolve_audio_ref;

#[derive(Serialize)]
pub struct AudioListResponse {
    pub audio_files: Vec<String>,
}

/// Recognized audio files under the library root, root-relative, in
/// deterministic (lexicographic, depth-first) order.
#[tracing::instrument(skip(state))]
pub async fn list_audio_handler(State(state): State<AppState>) -> impl IntoResponse {
    let root = state.settings.library.root.clone();
    let extensions: Vec<String> = state
        .settings
        .library
        .extensions
        .iter()
        .map(|e| e.to_ascii_lowercase())
        .collect();

    let mut audio_files = Vec::new();
    let walker = WalkDir::new(&root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0 || !entry.file_name().to_string_lossy().starts_with('.')
        });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::error!(error = %e, "Library walk failed");
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    format!("library walk failed: {}", e),
                );
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| extensions.iter().any(|known| *known == e.to_ascii_lowercase()))
            .unwrap_or(false);
        if !matches {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(&root) {
            let rel_path = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            audio_files.push(rel_path);
        }
    }

    (StatusCode::OK, Json(AudioListResponse { audio_files })).into_response()
}

/// Streams an audio file's bytes with a content type from its extension.
#[tracing::instrument(skip(state))]
pub async fn stream_audio_handler(
    State(state): State<AppState>,
    UrlPath(path): UrlPath<String>,
) -> impl IntoResponse {
    let audio = match resolve_audio_ref(&state, &path) {
        Ok(a) => a,
        Err(response) => return response,
    };

    let file = match tokio::fs::File::open(audio.abs_path()).await {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return error_response(
                StatusCode::NOT_FOUND,
                "not_found",
                format!("audio not found: {}", path),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, file = %path, "Failed to open audio file");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                format!("failed to open audio: {}", e),
            );
        }
    };

    let content_type = content_type_for(audio.extension());
    let stream = ReaderStream::new(file);

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type)],
        Body::from_stream(stream),
    )
        .into_response()
}

fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "wav" | "aiff" => "audio/wav",
        "mp3" => "audio/mpeg",
        "flac" => "audio/flac",
        "aac" | "m4a" => "audio/aac",
        "ogg" => "audio/ogg",
        _ => "application/octet-stream",
    }
}
