use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod callback;
pub mod health;

pub fn create_router(state: AppState) -> Router<()> {
    Router::new()
        .route("/api/vk/callback", post(callback::vk_callback))
        .route("/api/health", get(health::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
