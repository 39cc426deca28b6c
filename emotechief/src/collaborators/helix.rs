//! Twitch-backed collaborators.
//!
//! Redemption updates use the broadcaster's stored user token. Subscription
//! management and chat use an app access token, which is cached until it
//! is close to expiry.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use emote_db::UserToken;
use tokio::sync::Mutex;
use twitch_client::Token;
use twitch_client::api::{
    CreateSubscriptionRequest, RedemptionStatus, SubscriptionCondition, SubscriptionTransport,
    TwitchApiClient,
};
use twitch_client::auth::TwitchAuth;
use twitch_client::eventsub::{EVENT_REWARD_REDEMPTION, EVENT_REWARD_REDEMPTION_VERSION};

use super::*;
use crate::repository::SqliteRepository;

const APP_TOKEN_MARGIN_SECS: i64 = 5 * 60;

pub struct HelixCollaborator {
    api: TwitchApiClient,
    auth: Arc<TwitchAuth>,
    repo: SqliteRepository,
    callback_url: String,
    eventsub_secret: String,
    bot_user_id: String,
    app_token: Mutex<Option<Token>>,
}

fn to_twitch_token(t: &UserToken) -> Token {
    Token {
        access_token: t.access_token.clone(),
        refresh_token: t.refresh_token.clone(),
        scope: t.scope.clone(),
        expires_at: t.expires_at,
    }
}

impl HelixCollaborator {
    pub fn new(
        auth: Arc<TwitchAuth>,
        repo: SqliteRepository,
        callback_url: String,
        eventsub_secret: String,
        bot_user_id: String,
    ) -> Self {
        Self {
            api: TwitchApiClient::new(auth.client_id().to_string()),
            auth,
            repo,
            callback_url,
            eventsub_secret,
            bot_user_id,
            app_token: Mutex::new(None),
        }
    }

    /// Load a user's token, refreshing and persisting it when near expiry.
    async fn user_token(&self, user_id: &str) -> Result<Token, CollaboratorError> {
        let uid = user_id.to_string();
        let stored = self
            .repo
            .blocking(move |db| db.get_user_token(&uid))
            .await?
            .ok_or_else(|| CollaboratorError::MissingToken(user_id.to_string()))?;

        let current = to_twitch_token(&stored);
        match self.auth.get_or_refresh_token(&current).await? {
            None => Ok(current),
            Some(refreshed) => {
                let updated = UserToken {
                    access_token: refreshed.access_token.clone(),
                    refresh_token: if refreshed.refresh_token.is_empty() {
                        stored.refresh_token.clone()
                    } else {
                        refreshed.refresh_token.clone()
                    },
                    scope: refreshed.scope.clone(),
                    expires_at: refreshed.expires_at,
                    ..stored
                };
                let to_save = updated.clone();
                self.repo
                    .blocking(move |db| db.save_user_token(&to_save))
                    .await?;
                tracing::info!(user_id, "Refreshed user token");
                Ok(to_twitch_token(&updated))
            }
        }
    }

    async fn app_token(&self) -> Result<Token, CollaboratorError> {
        let mut slot = self.app_token.lock().await;
        if let Some(token) = slot.as_ref() {
            if Utc::now().timestamp() < token.expires_at - APP_TOKEN_MARGIN_SECS {
                return Ok(token.clone());
            }
        }
        let token = self.auth.app_access_token().await?;
        *slot = Some(token.clone());
        Ok(token)
    }
}

#[async_trait]
impl RedemptionUpdater for HelixCollaborator {
    async fn set_status(
        &self,
        broadcaster_id: &str,
        reward_id: &str,
        redemption_id: &str,
        status: RedemptionStatus,
    ) -> Result<(), CollaboratorError> {
        let token = self.user_token(broadcaster_id).await?;
        self.api
            .update_redemption_status(&token, broadcaster_id, reward_id, redemption_id, status)
            .await?;
        tracing::debug!(
            broadcaster_id,
            redemption_id,
            status = status.as_str(),
            "Redemption status updated"
        );
        Ok(())
    }
}

#[async_trait]
impl SubscriptionManager for HelixCollaborator {
    async fn subscribe(&self, user_id: &str) -> Result<(), CollaboratorError> {
        if self.callback_url.is_empty() || self.eventsub_secret.is_empty() {
            return Err(CollaboratorError::NotConfigured("EventSub webhook"));
        }
        let token = self.app_token().await?;
        let request = CreateSubscriptionRequest {
            kind: EVENT_REWARD_REDEMPTION.into(),
            version: EVENT_REWARD_REDEMPTION_VERSION.into(),
            condition: SubscriptionCondition {
                broadcaster_user_id: Some(user_id.to_string()),
                reward_id: None,
            },
            transport: SubscriptionTransport {
                method: "webhook".into(),
                callback: self.callback_url.clone(),
                secret: Some(self.eventsub_secret.clone()),
            },
        };

        match self.api.create_eventsub_subscription(&token, &request).await {
            Ok(sub) => {
                tracing::info!(user_id, subscription_id = %sub.id, "EventSub subscription created");
                Ok(())
            }
            // 409: an identical subscription already exists
            Err(twitch_client::TwitchError::ApiError { status: 409, .. }) => {
                tracing::info!(user_id, "EventSub subscription already exists");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn unsubscribe(&self, user_id: &str) -> Result<(), CollaboratorError> {
        let token = self.app_token().await?;
        let subs = self
            .api
            .get_eventsub_subscriptions_for_user(&token, user_id)
            .await?;

        for sub in subs.iter().filter(|s| {
            s.kind == EVENT_REWARD_REDEMPTION
                && s.condition.broadcaster_user_id.as_deref() == Some(user_id)
        }) {
            self.api.delete_eventsub_subscription(&token, &sub.id).await?;
            tracing::info!(user_id, subscription_id = %sub.id, "EventSub subscription deleted");
        }
        Ok(())
    }
}

#[async_trait]
impl ChatNotifier for HelixCollaborator {
    async fn say(&self, channel_id: &str, message: &str) -> Result<(), CollaboratorError> {
        if self.bot_user_id.is_empty() {
            return Err(CollaboratorError::NotConfigured("BOT_USER_ID"));
        }
        let token = self.app_token().await?;
        self.api
            .send_chat_message(&token, channel_id, &self.bot_user_id, message)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TokenValidator for HelixCollaborator {
    async fn validate(&self, access_token: &str) -> Result<AuthenticatedUser, CollaboratorError> {
        match self.auth.validate_token(access_token).await {
            Ok(v) => Ok(AuthenticatedUser {
                user_id: v.user_id,
                login: v.login,
            }),
            Err(twitch_client::TwitchError::AuthRequired) => Err(CollaboratorError::Unauthorized),
            Err(e) => Err(e.into()),
        }
    }
}
