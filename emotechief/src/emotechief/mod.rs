//! Redemption processing: parse, verify, apply and record emote changes.
//!
//! `EmoteChief` owns no storage or network clients itself; everything is
//! injected as trait objects so that tests can swap in fakes.

pub mod dedup;
pub mod locks;
pub mod parser;
pub mod verifier;


use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use emote_db::{EmoteAdd, EmoteChangeType, RewardType};
use twitch_client::api::RedemptionStatus;
use twitch_client::eventsub::RedemptionEvent;

use crate::collaborators::{ChatNotifier, CollaboratorError, EmoteProviders, RedemptionUpdater};
use crate::repository::{EmoteLedger, RewardRepository, StoreError, UserConfigRepository};
use crate::user_config::UserConfig;

pub use dedup::RedemptionDedup;
pub use locks::KeyedLocks;
pub use parser::extract_emote_id;
pub use verifier::{RewardOptions, SlotOptions, verify};

#[derive(Debug, thiserror::Error)]
pub enum ChiefError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    #[error("{0} timed out")]
    Timeout(&'static str),
}

/// Why a redemption was refunded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    NoEmoteLink,
    RedemptionInactive,
    AlreadyActive,
    NotPermitted,
    ProviderFailed(String),
    StoreFailed(String),
}

impl RejectReason {
    fn chat_text(&self) -> &'static str {
        match self {
            Self::NoEmoteLink => "no valid emote link found",
            Self::RedemptionInactive => "this reward is currently turned off",
            Self::AlreadyActive => "that emote is already added",
            Self::NotPermitted => "all emote slots are in use or the reward is disabled",
            Self::ProviderFailed(_) => "the emote provider rejected the change",
            Self::StoreFailed(_) => "something went wrong",
        }
    }
}

/// Terminal state of one processed redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedemptionOutcome {
    Recorded(EmoteAdd),
    Refunded(RejectReason),
    /// The reward is not one of ours.
    Ignored,
    Duplicate,
}

pub struct EmoteChief {
    ledger: Arc<dyn EmoteLedger>,
    rewards: Arc<dyn RewardRepository>,
    configs: Arc<dyn UserConfigRepository>,
    providers: EmoteProviders,
    redemptions: Arc<dyn RedemptionUpdater>,
    chat: Arc<dyn ChatNotifier>,
    locks: KeyedLocks<(String, RewardType)>,
    dedup: RedemptionDedup,
    timeout: Duration,
}

impl EmoteChief {
    pub fn new(
        ledger: Arc<dyn EmoteLedger>,
        rewards: Arc<dyn RewardRepository>,
        configs: Arc<dyn UserConfigRepository>,
        providers: EmoteProviders,
        redemptions: Arc<dyn RedemptionUpdater>,
        chat: Arc<dyn ChatNotifier>,
        timeout: Duration,
    ) -> Self {
        Self {
            ledger,
            rewards,
            configs,
            providers,
            redemptions,
            chat,
            locks: KeyedLocks::new(),
            dedup: RedemptionDedup::default(),
            timeout,
        }
    }

    async fn bounded<T, E>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T, E>>,
    ) -> Result<T, ChiefError>
    where
        ChiefError: From<E>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(ChiefError::from),
            Err(_) => Err(ChiefError::Timeout(op)),
        }
    }

    /// Process one redemption end to end.
    pub async fn process_redemption(&self, event: &RedemptionEvent) -> RedemptionOutcome {
        let channel_id = event.broadcaster_user_id.as_str();

        if !self.dedup.remember(&event.id).await {
            tracing::debug!(redemption_id = %event.id, "Duplicate redemption skipped");
            return RedemptionOutcome::Duplicate;
        }

        let reward = match self
            .bounded(
                "reward lookup",
                self.rewards.get_reward_by_id(channel_id, &event.reward.id),
            )
            .await
        {
            Ok(Some(reward)) => reward,
            Ok(None) => return RedemptionOutcome::Ignored,
            Err(e) => {
                // Refunding a redemption that is not ours is rejected by Twitch.
                tracing::error!(
                    channel_id,
                    redemption_id = %event.id,
                    error = %e,
                    "Reward lookup failed, refunding"
                );
                return self
                    .refund(event, RejectReason::StoreFailed(e.to_string()))
                    .await;
            }
        };
        let reward_type = reward.reward_type;

        match self.redemption_active(channel_id, reward_type).await {
            Ok(true) => {}
            Ok(false) => return self.refund(event, RejectReason::RedemptionInactive).await,
            Err(reason) => return self.refund(event, reason).await,
        }

        let Some(emote_id) = extract_emote_id(&event.user_input, reward_type) else {
            return self.refund(event, RejectReason::NoEmoteLink).await;
        };

        let recorded = {
            let guard = self.locks.lock((channel_id.to_string(), reward_type)).await;
            match self.apply_add(event, &reward, emote_id).await {
                Ok(record) => record,
                Err(reason) => {
                    drop(guard);
                    return self.refund(event, reason).await;
                }
            }
        };

        if let Err(e) = self
            .bounded(
                "fulfil redemption",
                self.redemptions.set_status(
                    channel_id,
                    &event.reward.id,
                    &event.id,
                    RedemptionStatus::Fulfilled,
                ),
            )
            .await
        {
            tracing::warn!(channel_id, redemption_id = %event.id, error = %e, "Failed to mark redemption fulfilled");
        }

        tracing::info!(
            channel_id,
            reward_type = %reward_type,
            emote_id,
            redemption_id = %event.id,
            user = %event.user_login,
            "Emote added"
        );
        self.announce(
            channel_id,
            &format!(
                "@{} added {} emote {}",
                event.user_login,
                provider_name(reward_type),
                emote_id
            ),
        )
        .await;

        RedemptionOutcome::Recorded(recorded)
    }

    /// Whether the owner's config has `reward_type` switched on. A missing or
    /// unreadable document counts as off.
    async fn redemption_active(
        &self,
        channel_id: &str,
        reward_type: RewardType,
    ) -> Result<bool, RejectReason> {
        let raw = self
            .bounded("config read", self.configs.get_document(channel_id))
            .await
            .map_err(|e| RejectReason::StoreFailed(e.to_string()))?;
        let Some(raw) = raw else {
            return Ok(false);
        };

        match serde_json::from_str::<UserConfig>(&raw) {
            Ok(config) => Ok(config.redemption(reward_type).is_some_and(|r| r.active)),
            Err(e) => {
                tracing::warn!(channel_id, error = %e, "Corrupted user config, denying redemption");
                Ok(false)
            }
        }
    }

    /// Verify, add at the provider and record. Runs under the channel lock.
    async fn apply_add(
        &self,
        event: &RedemptionEvent,
        reward: &emote_db::ChannelPointReward,
        emote_id: &str,
    ) -> Result<EmoteAdd, RejectReason> {
        let channel_id = event.broadcaster_user_id.as_str();
        let reward_type = reward.reward_type;

        let usage = self
            .bounded("usage count", self.ledger.active_count(channel_id, reward_type))
            .await
            .map_err(|e| RejectReason::StoreFailed(e.to_string()))?;

        let already_active = self
            .bounded(
                "active check",
                self.ledger.is_active(channel_id, reward_type, emote_id),
            )
            .await
            .map_err(|e| RejectReason::StoreFailed(e.to_string()))?;
        if already_active {
            return Err(RejectReason::AlreadyActive);
        }

        if !verify(Some(reward), usage, event) {
            return Err(RejectReason::NotPermitted);
        }

        let provider = self.providers.for_type(reward_type);
        self.bounded("provider add", provider.add_emote(channel_id, emote_id))
            .await
            .map_err(|e| RejectReason::ProviderFailed(e.to_string()))?;

        match self
            .bounded(
                "ledger append",
                self.ledger
                    .append(channel_id, reward_type, emote_id, EmoteChangeType::Add),
            )
            .await
        {
            Ok(record) => Ok(record),
            Err(e) => {
                tracing::error!(
                    channel_id,
                    reward_type = %reward_type,
                    emote_id,
                    error = %e,
                    "Emote added but not recorded, reverting at provider"
                );
                if let Err(revert) = self
                    .bounded("provider revert", provider.remove_emote(channel_id, emote_id))
                    .await
                {
                    tracing::error!(channel_id, emote_id, error = %revert, "Revert failed, ledger and provider disagree");
                }
                Err(RejectReason::StoreFailed(e.to_string()))
            }
        }
    }

    async fn refund(&self, event: &RedemptionEvent, reason: RejectReason) -> RedemptionOutcome {
        let channel_id = event.broadcaster_user_id.as_str();
        tracing::info!(
            channel_id,
            reward_id = %event.reward.id,
            redemption_id = %event.id,
            reason = ?reason,
            "Refunding redemption"
        );

        if let Err(e) = self
            .bounded(
                "refund redemption",
                self.redemptions.set_status(
                    channel_id,
                    &event.reward.id,
                    &event.id,
                    RedemptionStatus::Canceled,
                ),
            )
            .await
        {
            tracing::error!(channel_id, redemption_id = %event.id, error = %e, "Refund failed");
        }

        self.announce(
            channel_id,
            &format!(
                "@{} your \"{}\" redemption was refunded: {}",
                event.user_login,
                event.reward.title,
                reason.chat_text()
            ),
        )
        .await;

        RedemptionOutcome::Refunded(reason)
    }

    /// Remove an emote on the owner's behalf and record the removal.
    pub async fn remove_emote(
        &self,
        channel_id: &str,
        reward_type: RewardType,
        emote_id: &str,
    ) -> Result<EmoteAdd, ChiefError> {
        let _guard = self.locks.lock((channel_id.to_string(), reward_type)).await;

        let provider = self.providers.for_type(reward_type);
        self.bounded("provider remove", provider.remove_emote(channel_id, emote_id))
            .await?;
        let record = self
            .bounded(
                "ledger append",
                self.ledger
                    .append(channel_id, reward_type, emote_id, EmoteChangeType::Remove),
            )
            .await?;

        tracing::info!(channel_id, reward_type = %reward_type, emote_id, "Emote removed");
        Ok(record)
    }

    /// Best-effort chat feedback.
    async fn announce(&self, channel_id: &str, message: &str) {
        if let Err(e) = self
            .bounded("chat message", self.chat.say(channel_id, message))
            .await
        {
            tracing::debug!(channel_id, error = %e, "Chat feedback not sent");
        }
    }
}

fn provider_name(reward_type: RewardType) -> &'static str {
    match reward_type {
        RewardType::Bttv => "BetterTTV",
        RewardType::Seventv => "7TV",
    }
}
