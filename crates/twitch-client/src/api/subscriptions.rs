use super::*;

impl TwitchApiClient {
    /// Create an EventSub subscription. Webhook transports need an app token.
    pub async fn create_eventsub_subscription(
        &self,
        app_token: &Token,
        request: &CreateSubscriptionRequest,
    ) -> Result<EventSubSubscription, TwitchError> {
        let url = format!("{HELIX_BASE}/eventsub/subscriptions");
        let body = self.authenticated_post(&url, app_token, request).await?;
        let resp: HelixResponse<EventSubSubscription> = serde_json::from_str(&body)?;
        resp.data
            .into_iter()
            .next()
            .ok_or_else(|| TwitchError::ApiError {
                status: 404,
                message: "Subscription not found in response".into(),
            })
    }

    /// List every subscription whose condition names `user_id`.
    pub async fn get_eventsub_subscriptions_for_user(
        &self,
        app_token: &Token,
        user_id: &str,
    ) -> Result<Vec<EventSubSubscription>, TwitchError> {
        let mut out = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut url = format!("{HELIX_BASE}/eventsub/subscriptions?user_id={user_id}");
            if let Some(c) = &cursor {
                url.push_str(&format!("&after={c}"));
            }
            let body = self.authenticated_get(&url, app_token).await?;
            let resp: HelixPaginatedResponse<EventSubSubscription> = serde_json::from_str(&body)?;
            out.extend(resp.data);

            cursor = resp
                .pagination
                .and_then(|p| p.cursor)
                .filter(|c| !c.is_empty());
            if cursor.is_none() {
                break;
            }
        }

        Ok(out)
    }

    pub async fn delete_eventsub_subscription(
        &self,
        app_token: &Token,
        subscription_id: &str,
    ) -> Result<(), TwitchError> {
        let url = format!("{HELIX_BASE}/eventsub/subscriptions?id={subscription_id}");
        self.authenticated_delete(&url, app_token).await
    }
}
