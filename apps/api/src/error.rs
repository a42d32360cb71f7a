use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nightschool_core::AppError;
use serde::Serialize;
use tracing::error;
use ts_rs::TS;

pub const INVALID_MESSAGE_ERROR: &str = "Message is required";
pub const UNAUTHORIZED_ERROR: &str = "Unauthorized";
pub const RATE_LIMITED_ERROR: &str = "Rate limit exceeded. Please try again later.";
pub const INTERNAL_ERROR: &str = "Failed to process message";

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    error: String,
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, public_message) = match &self.0 {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, INVALID_MESSAGE_ERROR),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, UNAUTHORIZED_ERROR),
            AppError::RateLimited(_) => (StatusCode::TOO_MANY_REQUESTS, RATE_LIMITED_ERROR),
            AppError::Internal(detail) => {
                error!(%detail, "chat request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
            }
        };

        let payload = Json(ErrorResponse {
            error: public_message.to_owned(),
        });

        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
