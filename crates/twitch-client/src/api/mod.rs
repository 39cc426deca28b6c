//! Twitch Helix REST API client.
//!
//! Covers the endpoints needed to settle channel point redemptions,
//! manage EventSub webhook subscriptions and post chat feedback.
//! Every call injects the Bearer token and Client-Id headers.

mod chat;
mod redemptions;
mod request;
mod subscriptions;

pub mod models;

pub use models::{
    ChatMessageResult, CreateSubscriptionRequest, EventSubSubscription, HelixPaginatedResponse,
    HelixPagination, HelixResponse, RedemptionStatus, RewardRedemption, SubscriptionCondition,
    SubscriptionTransport,
};

use crate::{Token, TwitchError};

const HELIX_BASE: &str = "https://api.twitch.tv/helix";

/// Twitch Helix API client with automatic auth header injection.
#[derive(Clone)]
pub struct TwitchApiClient {
    pub(super) http: reqwest::Client,
    pub(super) client_id: String,
}
