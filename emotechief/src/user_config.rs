//! Per-user configuration documents with a server-controlled subtree.
//!
//! `Protected` is never taken from a client payload. Every write carries
//! over the previously stored value instead.

use std::sync::Arc;
use std::time::Duration;

use emote_db::RewardType;
use serde::{Deserialize, Serialize};

use crate::collaborators::{CollaboratorError, SubscriptionManager};
use crate::repository::{StoreError, UserConfigRepository};

pub const DEFAULT_BTTV_TITLE: &str = "Bttv emote";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Redemption {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Redemptions {
    #[serde(default)]
    pub bttv: Redemption,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seventv: Option<Redemption>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Protected {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub editor_for: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserConfig {
    #[serde(default)]
    pub redemptions: Redemptions,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub editors: Vec<String>,
    #[serde(default)]
    pub protected: Protected,
}

fn null_as_empty<'de, D>(d: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(d)?.unwrap_or_default())
}

impl UserConfig {
    /// Settings for `reward_type`, if the document has any.
    pub fn redemption(&self, reward_type: RewardType) -> Option<&Redemption> {
        match reward_type {
            RewardType::Bttv => Some(&self.redemptions.bttv),
            RewardType::Seventv => self.redemptions.seventv.as_ref(),
        }
    }

    /// Document returned for users that never saved one.
    pub fn default_document() -> Self {
        Self {
            redemptions: Redemptions {
                bttv: Redemption {
                    title: DEFAULT_BTTV_TITLE.into(),
                    active: false,
                },
                seventv: None,
            },
            editors: Vec::new(),
            protected: Protected::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("stored config is corrupted: {0}")]
    Corrupted(String),

    #[error("invalid config payload: {0}")]
    InvalidPayload(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("subscription change failed: {0}")]
    Subscription(#[from] CollaboratorError),

    #[error("{0} timed out")]
    Timeout(&'static str),
}

/// Subscription side effect of a [`ConfigStore::replace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionChange {
    /// The user already had a document.
    Unchanged,
    Subscribed,
    /// The document was saved but the subscription was not created.
    Failed(String),
}

pub struct ConfigStore {
    repo: Arc<dyn UserConfigRepository>,
    subscriptions: Arc<dyn SubscriptionManager>,
    timeout: Duration,
}

impl ConfigStore {
    pub fn new(
        repo: Arc<dyn UserConfigRepository>,
        subscriptions: Arc<dyn SubscriptionManager>,
        timeout: Duration,
    ) -> Self {
        Self {
            repo,
            subscriptions,
            timeout,
        }
    }

    async fn bounded<T, E>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T, E>>,
    ) -> Result<T, ConfigError>
    where
        ConfigError: From<E>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(ConfigError::from),
            Err(_) => Err(ConfigError::Timeout(op)),
        }
    }

    async fn load(&self, user_id: &str) -> Result<Option<UserConfig>, ConfigError> {
        let Some(raw) = self
            .bounded("config read", self.repo.get_document(user_id))
            .await?
        else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| ConfigError::Corrupted(e.to_string()))
    }

    /// Stored document, or the default one if the user has none.
    pub async fn get(&self, user_id: &str) -> Result<UserConfig, ConfigError> {
        Ok(self
            .load(user_id)
            .await?
            .unwrap_or_else(UserConfig::default_document))
    }

    /// Decode a client payload and store it with [`ConfigStore::replace`].
    pub async fn replace_from_json(
        &self,
        user_id: &str,
        body: &[u8],
    ) -> Result<SubscriptionChange, ConfigError> {
        let incoming: UserConfig =
            serde_json::from_slice(body).map_err(|e| ConfigError::InvalidPayload(e.to_string()))?;
        self.replace(user_id, incoming).await
    }

    /// Replace `Redemptions` and `Editors`, keeping the stored `Protected`.
    ///
    /// The first document saved for a user triggers the redemption
    /// subscription. A subscription failure keeps the document and is
    /// reported as [`SubscriptionChange::Failed`]; later saves do not retry.
    pub async fn replace(
        &self,
        user_id: &str,
        incoming: UserConfig,
    ) -> Result<SubscriptionChange, ConfigError> {
        let previous = self.load(user_id).await?;
        let is_new = previous.is_none();
        let protected = previous.map(|p| p.protected).unwrap_or_default();

        let to_save = UserConfig {
            redemptions: incoming.redemptions,
            editors: incoming.editors,
            protected,
        };
        let document = serde_json::to_string(&to_save)
            .map_err(|e| ConfigError::InvalidPayload(e.to_string()))?;
        self.bounded("config write", self.repo.put_document(user_id, document))
            .await?;

        if !is_new {
            return Ok(SubscriptionChange::Unchanged);
        }
        tracing::info!(user_id, "Created new config");
        match self
            .bounded("subscribe", self.subscriptions.subscribe(user_id))
            .await
        {
            Ok(()) => Ok(SubscriptionChange::Subscribed),
            Err(e) => {
                tracing::error!(
                    user_id,
                    error = %e,
                    "Failed to subscribe to redemptions, delete and save the config to retry"
                );
                Ok(SubscriptionChange::Failed(e.to_string()))
            }
        }
    }

    /// Remove the document, then the redemption subscription.
    pub async fn delete(&self, user_id: &str) -> Result<(), ConfigError> {
        self.bounded("config delete", self.repo.delete_document(user_id))
            .await?;

        if let Err(e) = self
            .bounded("unsubscribe", self.subscriptions.unsubscribe(user_id))
            .await
        {
            tracing::error!(
                user_id,
                error = %e,
                "Config deleted but unsubscribe failed, redemptions may still arrive"
            );
            return Err(e);
        }
        tracing::info!(user_id, "Deleted config");
        Ok(())
    }
}
