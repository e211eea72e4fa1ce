use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Body carried by every mutation response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Standard success response
pub fn success_message(message: impl Into<String>) -> Response {
    (
        StatusCode::OK,
        Json(MessageResponse {
            message: message.into(),
        }),
    )
        .into_response()
}

/// Standard created response
pub fn created_message(message: impl Into<String>) -> Response {
    (
        StatusCode::CREATED,
        Json(MessageResponse {
            message: message.into(),
        }),
    )
        .into_response()
}

/// Standard accepted response (mail-backed flows)
pub fn accepted_message(message: impl Into<String>) -> Response {
    (
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: message.into(),
        }),
    )
        .into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}
