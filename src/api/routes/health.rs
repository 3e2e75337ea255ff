use axum::Json;

use super::ok;
use crate::models::{ApiResponse, StatusPayload};

pub async fn health() -> Json<ApiResponse<StatusPayload>> {
    ok(StatusPayload::new("ok"), "Service healthy")
}
