//! 7TV emote set client.
//!
//! Resolves the channel's active emote set from its Twitch id and applies
//! changes with the `ChangeEmoteInSet` GraphQL mutation.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::*;

const PROVIDER: &str = "7TV";
const API_BASE: &str = "https://7tv.io/v3";

const CHANGE_EMOTE_IN_SET: &str = "mutation ChangeEmoteInSet($id: ObjectID!, $action: ListItemAction!, $emote_id: ObjectID!) {
  emoteSet(id: $id) {
    id
    emotes(id: $emote_id, action: $action) {
      id
      name
    }
  }
}";

#[derive(Debug, Deserialize)]
struct UserConnection {
    #[serde(default)]
    emote_set_id: Option<String>,
    #[serde(default)]
    emote_set: Option<EmoteSetRef>,
}

#[derive(Debug, Deserialize)]
struct EmoteSetRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GqlResponse {
    #[serde(default)]
    data: Option<ChangeEmoteData>,
    #[serde(default)]
    errors: Vec<GqlError>,
}

#[derive(Debug, Deserialize)]
struct ChangeEmoteData {
    #[serde(rename = "emoteSet")]
    emote_set: Option<EmoteSetRef>,
}

#[derive(Debug, Deserialize)]
struct GqlError {
    message: String,
}

#[derive(Clone)]
pub struct SevenTvClient {
    http: reqwest::Client,
    token: String,
    api_base: String,
}

impl SevenTvClient {
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

    fn ensure_configured(&self) -> Result<(), CollaboratorError> {
        if self.token.is_empty() {
            return Err(CollaboratorError::NotConfigured("SEVENTV_TOKEN"));
        }
        Ok(())
    }

    async fn emote_set_id(&self, channel_id: &str) -> Result<String, CollaboratorError> {
        let url = format!("{}/users/twitch/{channel_id}", self.api_base);
        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(CollaboratorError::Provider {
                provider: PROVIDER,
                message: format!("user lookup failed ({status}): {body}"),
            });
        }

        let conn: UserConnection =
            serde_json::from_str(&body).map_err(|e| CollaboratorError::Provider {
                provider: PROVIDER,
                message: format!("invalid user response: {e}"),
            })?;
        conn.emote_set
            .map(|s| s.id)
            .or(conn.emote_set_id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| CollaboratorError::Provider {
                provider: PROVIDER,
                message: "channel has no active emote set".into(),
            })
    }

    async fn change_emote(
        &self,
        channel_id: &str,
        emote_id: &str,
        action: &str,
    ) -> Result<(), CollaboratorError> {
        self.ensure_configured()?;
        let set_id = self.emote_set_id(channel_id).await?;

        let payload = json!({
            "operationName": "ChangeEmoteInSet",
            "query": CHANGE_EMOTE_IN_SET,
            "variables": {
                "id": set_id,
                "action": action,
                "emote_id": emote_id,
            },
        });

        let resp = self
            .http
            .post(format!("{}/gql", self.api_base))
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(CollaboratorError::Provider {
                provider: PROVIDER,
                message: format!("{status}: {body}"),
            });
        }

        check_mutation_response(&body)?;

        tracing::info!(channel_id, emote_id, action, emote_set_id = %set_id, "7TV emote set changed");
        Ok(())
    }
}

/// A mutation succeeded only if it decoded, carried no `errors` and
/// returned the changed emote set. GraphQL failures arrive with a 200.
fn check_mutation_response(body: &str) -> Result<(), CollaboratorError> {
    let provider_error = |message: String| CollaboratorError::Provider {
        provider: PROVIDER,
        message,
    };

    let parsed: GqlResponse = serde_json::from_str(body)
        .map_err(|e| provider_error(format!("invalid mutation response: {e}")))?;
    if let Some(err) = parsed.errors.first() {
        return Err(provider_error(err.message.clone()));
    }
    match parsed.data.and_then(|d| d.emote_set) {
        Some(_) => Ok(()),
        None => Err(provider_error("mutation returned no emote set".into())),
    }
}

#[async_trait]
impl EmoteProvider for SevenTvClient {
    async fn add_emote(&self, channel_id: &str, emote_id: &str) -> Result<(), CollaboratorError> {
        self.change_emote(channel_id, emote_id, "ADD").await
    }

    async fn remove_emote(
        &self,
        channel_id: &str,
        emote_id: &str,
    ) -> Result<(), CollaboratorError> {
        self.change_emote(channel_id, emote_id, "REMOVE").await
    }
}
