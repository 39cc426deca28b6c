use super::*;

impl TwitchApiClient {
    /// Send a chat message to `broadcaster_id`'s channel as `sender_id`.
    pub async fn send_chat_message(
        &self,
        token: &Token,
        broadcaster_id: &str,
        sender_id: &str,
        message: &str,
    ) -> Result<ChatMessageResult, TwitchError> {
        let url = format!("{HELIX_BASE}/chat/messages");

        #[derive(serde::Serialize)]
        struct Body<'a> {
            broadcaster_id: &'a str,
            sender_id: &'a str,
            message: &'a str,
        }

        let body = self
            .authenticated_post(
                &url,
                token,
                &Body {
                    broadcaster_id,
                    sender_id,
                    message,
                },
            )
            .await?;
        let resp: HelixResponse<ChatMessageResult> = serde_json::from_str(&body)?;
        let result = resp
            .data
            .into_iter()
            .next()
            .ok_or_else(|| TwitchError::ApiError {
                status: 404,
                message: "Chat message result missing".into(),
            })?;

        if !result.is_sent {
            tracing::warn!(
                broadcaster_id,
                drop_reason = ?result.drop_reason,
                "Chat message was dropped"
            );
        }
        Ok(result)
    }
}
