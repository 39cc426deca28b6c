//! Per-channel channel point reward configuration.

use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::{Database, DbError, OptionalExt, RewardType, now_millis};

/// A channel point reward owned by a channel, one per reward type.
///
/// `additional_options` is the raw JSON options blob; its shape depends on
/// `reward_type` and is decoded by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelPointReward {
    pub owner_twitch_id: String,
    pub reward_type: RewardType,
    pub reward_id: String,
    pub title: String,
    pub enabled: bool,
    pub additional_options: String,
    #[serde(default)]
    pub updated_at: i64,
}

const SELECT_COLUMNS: &str =
    "SELECT owner_twitch_id, reward_type, reward_id, title, enabled, additional_options, updated_at
     FROM channel_point_rewards";

fn row_to_reward(row: &Row<'_>) -> Result<ChannelPointReward, rusqlite::Error> {
    let reward_type: String = row.get(1)?;
    Ok(ChannelPointReward {
        owner_twitch_id: row.get(0)?,
        reward_type: reward_type.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, e.into())
        })?,
        reward_id: row.get(2)?,
        title: row.get(3)?,
        enabled: row.get(4)?,
        additional_options: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

impl Database {
    /// Insert or replace the reward for `(owner, reward_type)`.
    pub fn save_reward(&self, reward: &ChannelPointReward) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO channel_point_rewards
                    (owner_twitch_id, reward_type, reward_id, title, enabled, additional_options, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(owner_twitch_id, reward_type) DO UPDATE SET
                    reward_id = ?3, title = ?4, enabled = ?5, additional_options = ?6, updated_at = ?7",
                rusqlite::params![
                    reward.owner_twitch_id,
                    reward.reward_type.as_str(),
                    reward.reward_id,
                    reward.title,
                    reward.enabled,
                    reward.additional_options,
                    now_millis(),
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_reward(
        &self,
        owner_twitch_id: &str,
        reward_type: RewardType,
    ) -> Result<Option<ChannelPointReward>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} WHERE owner_twitch_id = ?1 AND reward_type = ?2"
            ))?;
            let reward = stmt
                .query_row(
                    rusqlite::params![owner_twitch_id, reward_type.as_str()],
                    row_to_reward,
                )
                .optional()?;
            Ok(reward)
        })
    }

    /// Look up the reward a redemption refers to.
    pub fn get_reward_by_id(
        &self,
        owner_twitch_id: &str,
        reward_id: &str,
    ) -> Result<Option<ChannelPointReward>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} WHERE owner_twitch_id = ?1 AND reward_id = ?2"
            ))?;
            let reward = stmt
                .query_row(rusqlite::params![owner_twitch_id, reward_id], row_to_reward)
                .optional()?;
            Ok(reward)
        })
    }

    pub fn get_rewards(&self, owner_twitch_id: &str) -> Result<Vec<ChannelPointReward>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} WHERE owner_twitch_id = ?1 ORDER BY reward_type"
            ))?;
            let rows = stmt.query_map([owner_twitch_id], row_to_reward)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
        })
    }

    pub fn delete_reward(
        &self,
        owner_twitch_id: &str,
        reward_type: RewardType,
    ) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM channel_point_rewards WHERE owner_twitch_id = ?1 AND reward_type = ?2",
                rusqlite::params![owner_twitch_id, reward_type.as_str()],
            )?;
            Ok(())
        })
    }
}
