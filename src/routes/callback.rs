use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::vk::types::{Event, EVENT_CONFIRMATION, EVENT_MESSAGE_NEW};

/// VK Callback API endpoint. VK expects the literal body `ok` for every
/// accepted event.
pub async fn vk_callback(
    State(state): State<AppState>,
    Json(event): Json<Event>,
) -> AppResult<Response> {
    if let Some(secret) = state.config.vk_secret.as_deref() {
        if event.secret.as_deref() != Some(secret) {
            return Err(AppError::forbidden());
        }
    }

    if event.group_id != Some(state.config.vk_group_id) {
        return Err(AppError::bad_request("missing or unexpected group_id"));
    }

    match event.kind.as_str() {
        EVENT_CONFIRMATION => {
            let token = state
                .config
                .vk_confirmation_token
                .clone()
                .ok_or_else(|| AppError::internal("confirmation token is not configured"))?;
            Ok(token.into_response())
        }
        EVENT_MESSAGE_NEW => {
            if let Some(message) = event.inbound_message() {
                state.dispatcher.handle(message).await;
            }
            Ok("ok".into_response())
        }
        other => {
            debug!(event_type = other, event_id = ?event.event_id, "ignoring callback event");
            Ok("ok".into_response())
        }
    }
}
