//! Emote history API.

use axum::Json;
use axum::extract::{Query, State};
use emote_db::RewardType;
use serde::Deserialize;
use serde_json::json;

use crate::app::SharedState;
use crate::server::auth::AuthUser;

use super::{ApiResult, err_json};

pub const HISTORY_PAGE_SIZE: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<i64>,
    pub added: Option<bool>,
}

/// GET /api/emotehistory?page=&added=
pub async fn get_history(
    State(state): State<SharedState>,
    user: AuthUser,
    Query(q): Query<HistoryQuery>,
) -> ApiResult {
    let page = q.page.unwrap_or(1);
    let added = q.added.unwrap_or(true);
    let history = state
        .ledger()
        .paginate(&user.user_id, page, HISTORY_PAGE_SIZE, added)
        .await
        .map_err(|e| err_json(500, &e.to_string()))?;
    Ok(Json(json!(history)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveEmoteRequest {
    pub reward_type: String,
    pub emote_id: String,
}

/// POST /api/emotehistory/remove
pub async fn remove_emote(
    State(state): State<SharedState>,
    user: AuthUser,
    Json(body): Json<RemoveEmoteRequest>,
) -> ApiResult {
    let reward_type: RewardType = body
        .reward_type
        .parse()
        .map_err(|e: String| err_json(400, &e))?;
    if body.emote_id.trim().is_empty() {
        return Err(err_json(400, "emoteId required"));
    }

    let record = state
        .chief()
        .remove_emote(&user.user_id, reward_type, body.emote_id.trim())
        .await
        .map_err(|e| {
            tracing::warn!(user_id = %user.user_id, error = %e, "Failed to remove emote");
            err_json(500, &e.to_string())
        })?;
    Ok(Json(json!(record)))
}
