//! BetterTTV shared emote client.

use async_trait::async_trait;
use serde::Deserialize;

use super::*;

const PROVIDER: &str = "BetterTTV";
const API_BASE: &str = "https://api.betterttv.net/3";

#[derive(Debug, Deserialize)]
struct BttvUser {
    id: String,
}

#[derive(Clone)]
pub struct BttvClient {
    http: reqwest::Client,
    token: String,
    api_base: String,
}

impl BttvClient {
    pub fn new(token: String) -> Self {
        Self::with_base(token, API_BASE.to_string())
    }

    pub fn with_base(token: String, api_base: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
            api_base,
        }
    }

    /// BetterTTV user id linked to a Twitch channel.
    async fn bttv_user_id(&self, channel_id: &str) -> Result<String, CollaboratorError> {
        let url = format!("{}/cached/users/twitch/{channel_id}", self.api_base);
        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(CollaboratorError::Provider {
                provider: PROVIDER,
                message: format!("user lookup failed ({status}): {body}"),
            });
        }
        let user: BttvUser = serde_json::from_str(&body).map_err(|e| CollaboratorError::Provider {
            provider: PROVIDER,
            message: format!("invalid user response: {e}"),
        })?;
        Ok(user.id)
    }

    async fn share(
        &self,
        channel_id: &str,
        emote_id: &str,
        method: reqwest::Method,
    ) -> Result<(), CollaboratorError> {
        if self.token.is_empty() {
            return Err(CollaboratorError::NotConfigured("BTTV_TOKEN"));
        }
        let user_id = self.bttv_user_id(channel_id).await?;
        let url = format!("{}/emotes/{emote_id}/shared/{user_id}", self.api_base);

        let resp = self
            .http
            .request(method.clone(), &url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await?;
            return Err(CollaboratorError::Provider {
                provider: PROVIDER,
                message: format!("{status}: {body}"),
            });
        }

        tracing::info!(channel_id, emote_id, method = %method, "BetterTTV shared emote changed");
        Ok(())
    }
}

#[async_trait]
impl EmoteProvider for BttvClient {
    async fn add_emote(&self, channel_id: &str, emote_id: &str) -> Result<(), CollaboratorError> {
        self.share(channel_id, emote_id, reqwest::Method::PUT).await
    }

    async fn remove_emote(
        &self,
        channel_id: &str,
        emote_id: &str,
    ) -> Result<(), CollaboratorError> {
        self.share(channel_id, emote_id, reqwest::Method::DELETE)
            .await
    }
}
