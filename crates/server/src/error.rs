//! Error-kind to HTTP status mapping. The core never sees HTTP; this is the
//! only place its taxonomy turns into status codes.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use quarry_error::{ErrorCode, ErrorKind, QuarryError};

pub enum ApiError {
    Core(QuarryError),
    BadRequest(String),
    Internal(String),
}

impl From<QuarryError> for ApiError {
    fn from(err: QuarryError) -> Self {
        ApiError::Core(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Core(err) => {
                let status = match err.kind() {
                    ErrorKind::UnknownName => StatusCode::NOT_FOUND,
                    ErrorKind::UnsupportedFormat | ErrorKind::MalformedQuery => {
                        StatusCode::BAD_REQUEST
                    }
                    ErrorKind::Transform => {
                        if err.code == ErrorCode::TypeCoercion {
                            StatusCode::UNPROCESSABLE_ENTITY
                        } else {
                            StatusCode::BAD_REQUEST
                        }
                    }
                    ErrorKind::Source => StatusCode::BAD_GATEWAY,
                    ErrorKind::MissingOptionalDependency => StatusCode::NOT_IMPLEMENTED,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                tracing::warn!(code = %err.code, status = %status, "request failed: {}", err);
                (status, Json(serde_json::json!({ "error": err }))).into_response()
            }
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": { "message": message } })),
            )
                .into_response(),
            ApiError::Internal(message) => {
                tracing::error!("internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": { "message": "internal error" } })),
                )
                    .into_response()
            }
        }
    }
}
