use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use instabids_core::error::{CoreError, PersistenceError};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The caller did not identify themselves.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// An admin operation the database rejected. The message is passed
    /// through so the admin UI can show it.
    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Not found: {0}")]
    RouteNotFound(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Core(core) => core_error_body(core),

            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": msg, "code": "BAD_REQUEST" }),
            ),
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": msg, "code": "UNAUTHORIZED" }),
            ),
            AppError::OperationFailed(msg) => {
                tracing::warn!(error = %msg, "Admin operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": msg, "code": "OPERATION_FAILED" }),
                )
            }
            AppError::RouteNotFound(path) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("No route for {path}"), "code": "NOT_FOUND" }),
            ),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

fn core_error_body(err: &CoreError) -> (StatusCode, serde_json::Value) {
    match err {
        CoreError::InvalidFields(fields) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({
                "error": "One or more fields are invalid",
                "code": "INVALID_FIELDS",
                "fields": fields,
            }),
        ),
        CoreError::Validation(msg) => (
            StatusCode::BAD_REQUEST,
            json!({ "error": msg, "code": "VALIDATION_ERROR" }),
        ),
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            json!({
                "error": format!("{entity} with id {id} not found"),
                "code": "NOT_FOUND",
            }),
        ),
        CoreError::Persistence(p) => persistence_body(p),
    }
}

/// Persistence failures are 502s the client may retry. Upload and record
/// stages also report which media already reached storage.
fn persistence_body(err: &PersistenceError) -> (StatusCode, serde_json::Value) {
    let message = match err {
        PersistenceError::UploadFailed { filename, .. } => {
            format!("Failed to upload '{filename}'")
        }
        PersistenceError::RecordWriteFailed { .. } => {
            "Media was uploaded but the bid card could not be saved".to_string()
        }
        PersistenceError::Unavailable(_) => "Storage is temporarily unavailable".to_string(),
    };
    (
        StatusCode::BAD_GATEWAY,
        json!({
            "error": message,
            "code": "PERSISTENCE_ERROR",
            "stage": err.stage(),
            "retryable": true,
            "orphanedMedia": err.orphaned_media(),
        }),
    )
}

fn internal() -> (StatusCode, serde_json::Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "An internal error occurred", "code": "INTERNAL_ERROR" }),
    )
}
