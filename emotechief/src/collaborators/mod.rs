//! External side effects: emote providers, Twitch redemption status,
//! EventSub subscriptions, chat feedback and token validation.
//!
//! The orchestrator and HTTP layer depend only on these traits. Concrete
//! clients live in the submodules.

mod bttv;
mod helix;
mod seventv;

use std::sync::Arc;

use async_trait::async_trait;
use emote_db::RewardType;
use twitch_client::TwitchError;
use twitch_client::api::RedemptionStatus;

use crate::repository::StoreError;

pub use bttv::BttvClient;
pub use helix::HelixCollaborator;
pub use seventv::SevenTvClient;

#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("Twitch error: {0}")]
    Twitch(#[from] TwitchError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} rejected the request: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("no stored token for user {0}")]
    MissingToken(String),

    #[error("unauthorized")]
    Unauthorized,
}

/// Adds and removes emotes in a channel's provider emote set.
#[async_trait]
pub trait EmoteProvider: Send + Sync {
    async fn add_emote(&self, channel_id: &str, emote_id: &str) -> Result<(), CollaboratorError>;

    async fn remove_emote(&self, channel_id: &str, emote_id: &str)
    -> Result<(), CollaboratorError>;
}

/// Settles a channel point redemption.
#[async_trait]
pub trait RedemptionUpdater: Send + Sync {
    async fn set_status(
        &self,
        broadcaster_id: &str,
        reward_id: &str,
        redemption_id: &str,
        status: RedemptionStatus,
    ) -> Result<(), CollaboratorError>;
}

/// Manages the redemption event subscription for a channel.
#[async_trait]
pub trait SubscriptionManager: Send + Sync {
    async fn subscribe(&self, user_id: &str) -> Result<(), CollaboratorError>;

    async fn unsubscribe(&self, user_id: &str) -> Result<(), CollaboratorError>;
}

#[async_trait]
pub trait ChatNotifier: Send + Sync {
    async fn say(&self, channel_id: &str, message: &str) -> Result<(), CollaboratorError>;
}

/// The Twitch user a bearer token belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub login: String,
}

#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate(&self, access_token: &str) -> Result<AuthenticatedUser, CollaboratorError>;
}

/// One emote provider per reward type.
#[derive(Clone)]
pub struct EmoteProviders {
    pub bttv: Arc<dyn EmoteProvider>,
    pub seventv: Arc<dyn EmoteProvider>,
}

impl EmoteProviders {
    pub fn for_type(&self, reward_type: RewardType) -> &Arc<dyn EmoteProvider> {
        match reward_type {
            RewardType::Bttv => &self.bttv,
            RewardType::Seventv => &self.seventv,
        }
    }
}
