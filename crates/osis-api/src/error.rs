use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use osis_db::DbError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate vote: {0}")]
    DuplicateVote(String),

    #[error("Referential error: {0}")]
    Referential(String),

    #[error("Storage error: {0}")]
    Storage(#[source] DbError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::DuplicateVote(_) => StatusCode::CONFLICT,
            Self::Referential(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::DuplicateVote(_) => "DUPLICATE_VOTE",
            Self::Referential(_) => "REFERENTIAL_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to clients. Server-side failures never expose
    /// the underlying cause.
    fn client_message(&self) -> String {
        match self {
            Self::Storage(_) => "A storage error occurred".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Validation(msg) => Self::Validation(msg),
            e @ DbError::NotFound { .. } => Self::NotFound(e.to_string()),
            e @ DbError::DuplicateVote { .. } => Self::DuplicateVote(e.to_string()),
            e @ DbError::Referential { .. } => Self::Referential(e.to_string()),
            e @ (DbError::Storage(_) | DbError::Poisoned(_)) => Self::Storage(e),
        }
    }
}

/// Malformed or incomplete bodies (missing fields, unknown fields, bad JSON,
/// wrong content type) are client validation failures.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(e) => Self::Validation(e.body_text()),
            other => Self::Internal(other.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.client_message(),
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_client_statuses() {
        let cases = [
            (DbError::Validation("title is required".into()), StatusCode::BAD_REQUEST),
            (
                DbError::NotFound { entity: "topic", id: "x".into() },
                StatusCode::NOT_FOUND,
            ),
            (
                DbError::DuplicateVote { user_id: "u".into(), topic_id: "t".into() },
                StatusCode::CONFLICT,
            ),
            (
                DbError::Referential { option_id: "o".into(), topic_id: "t".into() },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (DbError::Poisoned("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (db_err, status) in cases {
            assert_eq!(ApiError::from(db_err).status_code(), status);
        }
    }

    #[test]
    fn storage_errors_are_redacted() {
        let err = ApiError::from(DbError::Poisoned("driver failure".into()));
        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert_eq!(err.client_message(), "A storage error occurred");
        assert!(err.to_string().contains("driver failure"));
    }
}
