//! EventSub webhook handling for channel point redemptions.
//!
//! Twitch delivers events as signed HTTP POSTs to the callback URL. This
//! module verifies the HMAC signature, classifies the message and decodes
//! the redemption payload. Subscription management lives in `api`.

mod webhook;

use serde::{Deserialize, Serialize};

pub use webhook::{WebhookMessage, is_fresh, parse_webhook, sign, verify_signature};

/// Event type for custom reward redemptions.
pub const EVENT_REWARD_REDEMPTION: &str = "channel.channel_points_custom_reward_redemption.add";
pub const EVENT_REWARD_REDEMPTION_VERSION: &str = "1";

pub const HEADER_MESSAGE_ID: &str = "Twitch-Eventsub-Message-Id";
pub const HEADER_MESSAGE_TIMESTAMP: &str = "Twitch-Eventsub-Message-Timestamp";
pub const HEADER_MESSAGE_SIGNATURE: &str = "Twitch-Eventsub-Message-Signature";
pub const HEADER_MESSAGE_TYPE: &str = "Twitch-Eventsub-Message-Type";

pub const MESSAGE_TYPE_NOTIFICATION: &str = "notification";
pub const MESSAGE_TYPE_VERIFICATION: &str = "webhook_callback_verification";
pub const MESSAGE_TYPE_REVOCATION: &str = "revocation";

/// Messages older than this are rejected as replays.
pub const MAX_MESSAGE_AGE_SECS: i64 = 10 * 60;

/// Subscription metadata carried by every webhook message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookSubscription {
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub condition: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RedemptionRewardInfo {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub cost: u64,
    #[serde(default)]
    pub prompt: String,
}

/// `channel.channel_points_custom_reward_redemption.add` event body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RedemptionEvent {
    pub id: String,
    pub broadcaster_user_id: String,
    #[serde(default)]
    pub broadcaster_user_login: String,
    #[serde(default)]
    pub broadcaster_user_name: String,
    pub user_id: String,
    #[serde(default)]
    pub user_login: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_input: String,
    #[serde(default)]
    pub status: String,
    pub reward: RedemptionRewardInfo,
    #[serde(default)]
    pub redeemed_at: String,
}
