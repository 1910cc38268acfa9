use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::json;

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "group_id": state.config.vk_group_id })),
    )
}
