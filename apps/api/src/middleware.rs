use axum::extract::Request;
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use nightschool_core::AppError;

use crate::error::ApiResult;

/// Requires an `Authorization` header to be present.
///
/// Only presence is checked: the token is neither parsed nor verified.
pub async fn require_authorization_header(request: Request, next: Next) -> ApiResult<Response> {
    let has_credential = request
        .headers()
        .get(header::AUTHORIZATION)
        .is_some_and(|value| !value.is_empty());

    if !has_credential {
        return Err(AppError::Unauthorized("authorization header required".to_owned()).into());
    }

    Ok(next.run(request).await)
}
