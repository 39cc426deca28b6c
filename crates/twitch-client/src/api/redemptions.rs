use super::*;

impl TwitchApiClient {
    /// Move a redemption out of the unfulfilled queue.
    ///
    /// `Canceled` refunds the viewer's points, `Fulfilled` keeps them spent.
    pub async fn update_redemption_status(
        &self,
        token: &Token,
        broadcaster_id: &str,
        reward_id: &str,
        redemption_id: &str,
        status: RedemptionStatus,
    ) -> Result<RewardRedemption, TwitchError> {
        let url = format!(
            "{HELIX_BASE}/channel_points/custom_rewards/redemptions?broadcaster_id={broadcaster_id}&reward_id={reward_id}&id={redemption_id}"
        );

        #[derive(serde::Serialize)]
        struct Body {
            status: RedemptionStatus,
        }

        let body = self
            .authenticated_patch(&url, token, &Body { status })
            .await?;
        let resp: HelixResponse<RewardRedemption> = serde_json::from_str(&body)?;

        resp.data
            .into_iter()
            .next()
            .ok_or_else(|| TwitchError::ApiError {
                status: 404,
                message: "Redemption not found in response".into(),
            })
    }
}
