use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use nightschool_core::NonEmptyString;

use crate::dto::{ChatRequest, ChatResponse};
use crate::error::ApiResult;
use crate::request_context::caller_key_from_headers;
use crate::state::AppState;

pub async fn chat_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<ChatResponse>> {
    let request = ChatRequest::from_json_body(&body)?;
    let message = NonEmptyString::new(request.message)?;
    let caller_key = caller_key_from_headers(&headers);

    let reply = state.chat_service.reply(&caller_key, &message).await?;

    Ok(Json(ChatResponse { message: reply }))
}
