mod audio;
mod error_response;
mod health;
mod records;

pub use audio::{list_audio_handler, stream_audio_handler};
pub use health::health_handler;
pub use records::{append_annotation_handler, get_record_handler, update_transcript_handler};

use axum::http::StatusCode;
use axum::response::Response;

use crate::domain::AudioFileRef;
use crate::presentation::state::AppState;

use error_response::error_response;

/// Shared traversal guard: turn a URL path into an [`AudioFileRef`] under
/// the library root, rejecting absolute and `..`-bearing paths.
fn resolve_audio_ref(state: &AppState, raw_path: &str) -> Result<AudioFileRef, Response> {
    let filename = raw_path.rsplit('/').next().unwrap_or(raw_path);
    let metadata = state.extractor.extract(filename);
    AudioFileRef::new(&state.settings.library.root, raw_path, metadata).map_err(|e| {
        tracing::warn!(path = %raw_path, error = %e, "Rejected request path");
        error_response(StatusCode::BAD_REQUEST, "invalid_path", e.to_string())
    })
}
