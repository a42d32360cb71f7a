use axum::Json;

use crate::dto::HealthResponse;

pub mod chat;

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
