use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use super::api;
use crate::app::SharedState;

/// Create the axum router with all routes.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        // --- Core ---
        .route("/status", get(status_handler))
        // --- Twitch OAuth ---
        .route("/api/auth", get(api::callback::auth_redirect))
        .route("/api/callback", get(api::callback::callback))
        // --- EventSub webhook ---
        .route("/api/eventsub", post(api::eventsub::webhook))
        // --- User config ---
        .route(
            "/api/userconfig",
            get(api::user_config::get_user_config)
                .post(api::user_config::save_user_config)
                .delete(api::user_config::delete_user_config),
        )
        // --- Emote history ---
        .route("/api/emotehistory", get(api::emote_history::get_history))
        .route("/api/emotehistory/remove", post(api::emote_history::remove_emote))
        // --- Rewards ---
        .route(
            "/api/reward",
            get(api::reward::get_rewards)
                .post(api::reward::save_reward)
                .delete(api::reward::delete_reward),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn status_handler() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}
