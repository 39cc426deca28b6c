//! Channel point reward configuration API.

use axum::Json;
use axum::extract::{Query, State};
use emote_db::{ChannelPointReward, RewardType};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::app::SharedState;
use crate::emotechief::RewardOptions;
use crate::server::auth::AuthUser;

use super::{ApiResult, err_json};

/// GET /api/reward
pub async fn get_rewards(State(state): State<SharedState>, user: AuthUser) -> ApiResult {
    let rewards = state
        .rewards()
        .list_rewards(&user.user_id)
        .await
        .map_err(|e| err_json(500, &e.to_string()))?;
    Ok(Json(json!(rewards)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRewardRequest {
    pub reward_type: RewardType,
    pub reward_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub enabled: bool,
    /// Either a JSON object or its string encoding.
    #[serde(default)]
    pub additional_options: Value,
}

fn options_blob(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// POST /api/reward
pub async fn save_reward(
    State(state): State<SharedState>,
    user: AuthUser,
    Json(body): Json<SaveRewardRequest>,
) -> ApiResult {
    if body.reward_id.trim().is_empty() {
        return Err(err_json(400, "rewardId required"));
    }
    let additional_options = options_blob(&body.additional_options);
    if RewardOptions::decode(body.reward_type, &additional_options).is_none() {
        return Err(err_json(
            400,
            &format!("invalid additionalOptions for {}", body.reward_type),
        ));
    }

    let reward = ChannelPointReward {
        owner_twitch_id: user.user_id.clone(),
        reward_type: body.reward_type,
        reward_id: body.reward_id.trim().to_string(),
        title: body.title,
        enabled: body.enabled,
        additional_options,
        updated_at: 0,
    };
    state
        .rewards()
        .save_reward(reward.clone())
        .await
        .map_err(|e| err_json(500, &e.to_string()))?;

    tracing::info!(
        user_id = %user.user_id,
        reward_type = %reward.reward_type,
        enabled = reward.enabled,
        "Reward saved"
    );
    Ok(Json(json!(reward)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRewardQuery {
    pub reward_type: String,
}

/// DELETE /api/reward?rewardType=
pub async fn delete_reward(
    State(state): State<SharedState>,
    user: AuthUser,
    Query(q): Query<DeleteRewardQuery>,
) -> ApiResult {
    let reward_type: RewardType = q
        .reward_type
        .parse()
        .map_err(|e: String| err_json(400, &e))?;

    let existing = state
        .rewards()
        .get_reward(&user.user_id, reward_type)
        .await
        .map_err(|e| err_json(500, &e.to_string()))?
        .ok_or_else(|| err_json(404, &format!("no {reward_type} reward configured")))?;
    state
        .rewards()
        .delete_reward(&user.user_id, reward_type)
        .await
        .map_err(|e| err_json(500, &e.to_string()))?;

    tracing::info!(user_id = %user.user_id, reward_type = %reward_type, "Reward deleted");
    Ok(Json(json!(existing)))
}
