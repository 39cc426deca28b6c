//! Redemption permission check against stored reward options.

use emote_db::{ChannelPointReward, RewardType};
use serde::{Deserialize, Serialize};
use twitch_client::eventsub::RedemptionEvent;

/// Options shared by the slot-limited emote rewards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotOptions {
    pub slots: u32,
}

/// Decoded `additional_options`, one variant per reward type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardOptions {
    Bttv(SlotOptions),
    Seventv(SlotOptions),
}

impl RewardOptions {
    /// Decode the options blob for `reward_type`. Malformed input is `None`.
    pub fn decode(reward_type: RewardType, blob: &str) -> Option<Self> {
        let options: SlotOptions = serde_json::from_str(blob).ok()?;
        Some(match reward_type {
            RewardType::Bttv => Self::Bttv(options),
            RewardType::Seventv => Self::Seventv(options),
        })
    }

    pub fn slots(&self) -> u32 {
        match self {
            Self::Bttv(o) | Self::Seventv(o) => o.slots,
        }
    }
}

/// Whether `event` may add another emote given `current_usage`.
///
/// Anything missing, disabled, mismatched or undecodable denies.
pub fn verify(
    reward: Option<&ChannelPointReward>,
    current_usage: i64,
    event: &RedemptionEvent,
) -> bool {
    let Some(reward) = reward else {
        return false;
    };
    if !reward.enabled || reward.reward_id != event.reward.id {
        return false;
    }
    let Some(options) = RewardOptions::decode(reward.reward_type, &reward.additional_options)
    else {
        tracing::warn!(
            owner_id = %reward.owner_twitch_id,
            reward_type = %reward.reward_type,
            "Undecodable reward options, denying redemption"
        );
        return false;
    };
    current_usage >= 0 && current_usage < i64::from(options.slots())
}
