use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// StorageError
///
/// Any failure raised by a `Repository` backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// ContactError
///
/// Failure taxonomy of the contact operations. Every variant aborts the operation
/// at the point it is raised.
#[derive(Debug, Error)]
pub enum ContactError {
    /// The id does not resolve to an active contact.
    #[error("contact {0} not found")]
    NotFound(i64),

    /// The principal is neither an admin nor the owner.
    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid payload: {0}")]
    Validation(String),

    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // Missing contacts surface as a bad request, matching the existing API clients.
            ContactError::NotFound(_) => (StatusCode::BAD_REQUEST, "Contact not found".to_string()),
            ContactError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ContactError::Validation(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ContactError::Storage(e) => {
                tracing::error!("storage failure: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
