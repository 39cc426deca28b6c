//! User configuration API.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde_json::{Value, json};

use crate::app::SharedState;
use crate::server::auth::AuthUser;
use crate::user_config::{ConfigError, SubscriptionChange};

use super::{ApiResult, err_json, ok_json};

fn map_config_error(err: ConfigError) -> (axum::http::StatusCode, Json<Value>) {
    match &err {
        ConfigError::Corrupted(_) | ConfigError::InvalidPayload(_) => {
            err_json(400, &err.to_string())
        }
        _ => err_json(500, &err.to_string()),
    }
}

/// GET /api/userconfig
pub async fn get_user_config(State(state): State<SharedState>, user: AuthUser) -> ApiResult {
    let config = state
        .config_store()
        .get(&user.user_id)
        .await
        .map_err(|e| {
            tracing::error!(user_id = %user.user_id, error = %e, "Failed to load user config");
            map_config_error(e)
        })?;
    Ok(Json(json!(config)))
}

/// POST /api/userconfig
pub async fn save_user_config(
    State(state): State<SharedState>,
    user: AuthUser,
    body: Bytes,
) -> ApiResult {
    let change = state
        .config_store()
        .replace_from_json(&user.user_id, &body)
        .await
        .map_err(|e| {
            tracing::warn!(user_id = %user.user_id, error = %e, "Failed processing config");
            map_config_error(e)
        })?;
    match change {
        SubscriptionChange::Failed(reason) => Ok(Json(json!({
            "status": "ok",
            "warning": format!(
                "config saved but redemption subscription failed ({reason}); delete and save the config to retry"
            ),
        }))),
        _ => Ok(ok_json()),
    }
}

/// DELETE /api/userconfig
pub async fn delete_user_config(State(state): State<SharedState>, user: AuthUser) -> ApiResult {
    state
        .config_store()
        .delete(&user.user_id)
        .await
        .map_err(|e| err_json(500, &e.to_string()))?;
    Ok(ok_json())
}
