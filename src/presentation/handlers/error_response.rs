use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::ports::RecordStoreError;

/// Structured error body; `kind` carries the error taxonomy so UI clients
/// can branch without parsing the message.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}

pub fn error_response(status: StatusCode, kind: &'static str, error: String) -> Response {
    (status, Json(ErrorResponse { error, kind })).into_response()
}

pub fn store_error_response(e: RecordStoreError) -> Response {
    match e {
        RecordStoreError::NotFound(_) => {
            error_response(StatusCode::NOT_FOUND, "not_found", e.to_string())
        }
        RecordStoreError::AlreadyExists(_) => {
            error_response(StatusCode::CONFLICT, "already_exists", e.to_string())
        }
        RecordStoreError::Corrupt(_) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "corrupt_record", e.to_string())
        }
        RecordStoreError::WriteFailed(_) | RecordStoreError::Io(_) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "write_failure", e.to_string())
        }
    }
}
