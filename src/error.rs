use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// The single failure kind for provider calls: transport, HTTP status, body
/// parsing and response shape all collapse into this.
#[derive(Debug, Error)]
#[error("Translation failed: {message}")]
pub struct TranslationError {
    message: String,
}

impl TranslationError {
    pub fn new(cause: impl std::fmt::Display) -> Self {
        Self {
            message: cause.to_string(),
        }
    }

    /// Message of the underlying cause, without the prefix
    pub fn cause(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Translation {0} not found")]
    NotFound(i32),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Translation(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ServiceError::Store(StoreError::Database(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
