use serde::{Deserialize, Serialize};

/// Wrapper for Twitch Helix responses.
#[derive(Debug, Deserialize)]
pub struct HelixResponse<T> {
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct HelixPagination {
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HelixPaginatedResponse<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Option<HelixPagination>,
}

/// Final state a redemption can be moved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedemptionStatus {
    Unfulfilled,
    Fulfilled,
    Canceled,
}

impl RedemptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unfulfilled => "UNFULFILLED",
            Self::Fulfilled => "FULFILLED",
            Self::Canceled => "CANCELED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedemptionReward {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub cost: u64,
}

/// Redemption entry from the custom reward redemptions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardRedemption {
    pub id: String,
    pub broadcaster_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_login: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_input: String,
    pub status: RedemptionStatus,
    pub reward: RedemptionReward,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SubscriptionCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcaster_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubscriptionTransport {
    pub method: String,
    #[serde(default)]
    pub callback: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

/// Body for `POST /eventsub/subscriptions`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateSubscriptionRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub version: String,
    pub condition: SubscriptionCondition,
    pub transport: SubscriptionTransport,
}

/// Subscription entry from `GET /eventsub/subscriptions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSubSubscription {
    pub id: String,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub version: String,
    pub condition: SubscriptionCondition,
    pub transport: SubscriptionTransport,
    #[serde(default)]
    pub created_at: String,
}

/// Result entry from `POST /chat/messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageResult {
    #[serde(default)]
    pub message_id: String,
    pub is_sent: bool,
    #[serde(default)]
    pub drop_reason: Option<serde_json::Value>,
}
