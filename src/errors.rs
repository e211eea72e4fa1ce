use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};

/// Error payload returned to clients on every failure path.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Forbidden")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    ValidationRejected(String),

    #[error("{0} is already taken")]
    UniquenessConflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Media error: {0}")]
    MediaError(String),

    #[error("Mail delivery failed: {0}")]
    MailError(String),

    #[error("Internal error: {0}")]
    Internal(
        #[from]
        anyhow::Error,
    ),
}

impl ServiceError {
    /// Wraps a database error raised by a create/update/delete statement.
    ///
    /// Unique-index violations are the storage-level backstop for the
    /// sibling scan, so they surface as the same rejection the scan
    /// produces instead of as a generic persistence failure.
    pub fn from_db_write(err: DbErr) -> Self {
        if let Some(sea_orm::SqlErr::UniqueConstraintViolation(field)) = err.sql_err() {
            return ServiceError::UniquenessConflict(field);
        }
        ServiceError::DatabaseError(err)
    }

    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Gate rejections: detected before any mutation
            Self::ValidationRejected(_) | Self::UniquenessConflict(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            // Persistence and post-gate failures, plus anything unexpected,
            // all surface as the persistence-failure class
            Self::DatabaseError(_)
            | Self::BadRequest(_)
            | Self::MediaError(_)
            | Self::MailError(_)
            | Self::Internal(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Returns the message suitable for HTTP responses.
    /// Internal errors return generic messages to avoid leaking detail.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Persistence failure".to_string(),
            Self::Internal(_) => "Unexpected failure".to_string(),
            Self::MediaError(_) => "Image processing failure".to_string(),
            Self::MailError(_) => "Mail delivery failure".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::BAD_REQUEST {
            // Everything in the persistence-failure class carries detail the
            // client must not see; keep it in the server log only.
            tracing::error!(error = %self, "request failed");
        }

        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_mapping() {
        assert_eq!(
            ServiceError::ValidationRejected("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ServiceError::UniquenessConflict("name".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ServiceError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServiceError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("boom".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::MediaError("decode".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn response_message_hides_internal_details() {
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("secret dsn".into())).response_message(),
            "Persistence failure"
        );
        assert_eq!(
            ServiceError::Internal(anyhow::anyhow!("stack detail")).response_message(),
            "Unexpected failure"
        );

        // Gate rejections keep their human-readable reason
        assert_eq!(
            ServiceError::UniquenessConflict("name".into()).response_message(),
            "name is already taken"
        );
        assert_eq!(
            ServiceError::ValidationRejected("name must be 2-50 characters".into())
                .response_message(),
            "name must be 2-50 characters"
        );
    }
}
