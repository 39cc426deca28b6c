//! REST API handlers grouped by domain.

pub mod callback;
pub mod emote_history;
pub mod eventsub;
pub mod reward;
pub mod user_config;

#[cfg(test)]
mod tests;

use axum::Json;
use serde_json::{Value, json};

pub(crate) type ApiResult = Result<Json<Value>, (axum::http::StatusCode, Json<Value>)>;

/// Standard success response.
pub fn ok_json() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Standard error response.
pub fn err_json(status: u16, message: &str) -> (axum::http::StatusCode, Json<Value>) {
    (
        axum::http::StatusCode::from_u16(status)
            .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
        Json(json!({ "status": "error", "error": message })),
    )
}
