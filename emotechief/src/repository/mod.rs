//! Storage seams used by the orchestrator, config store and HTTP layer.
//!
//! Domain code only sees these traits. `sqlite` backs them with emote-db,
//! running every call on the blocking pool.

mod sqlite;

use async_trait::async_trait;
use emote_db::{ChannelPointReward, DbError, EmoteAdd, EmoteChangeType, RewardType};

pub use sqlite::SqliteRepository;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] DbError),

    #[error("blocking task failed: {0}")]
    Join(String),
}

/// Append-only emote history.
#[async_trait]
pub trait EmoteLedger: Send + Sync {
    async fn append(
        &self,
        channel_id: &str,
        reward_type: RewardType,
        emote_id: &str,
        change_type: EmoteChangeType,
    ) -> Result<EmoteAdd, StoreError>;

    async fn query_recent(
        &self,
        channel_id: &str,
        reward_type: RewardType,
        change_type: EmoteChangeType,
        limit: i64,
    ) -> Result<Vec<EmoteAdd>, StoreError>;

    /// Emotes added and not removed since; the slot usage.
    async fn active_count(&self, channel_id: &str, reward_type: RewardType)
    -> Result<i64, StoreError>;

    async fn is_active(
        &self,
        channel_id: &str,
        reward_type: RewardType,
        emote_id: &str,
    ) -> Result<bool, StoreError>;

    async fn paginate(
        &self,
        channel_id: &str,
        page: i64,
        page_size: i64,
        added_only: bool,
    ) -> Result<Vec<EmoteAdd>, StoreError>;
}

#[async_trait]
pub trait RewardRepository: Send + Sync {
    async fn save_reward(&self, reward: ChannelPointReward) -> Result<(), StoreError>;

    async fn get_reward(
        &self,
        owner_id: &str,
        reward_type: RewardType,
    ) -> Result<Option<ChannelPointReward>, StoreError>;

    async fn get_reward_by_id(
        &self,
        owner_id: &str,
        reward_id: &str,
    ) -> Result<Option<ChannelPointReward>, StoreError>;

    async fn list_rewards(&self, owner_id: &str) -> Result<Vec<ChannelPointReward>, StoreError>;

    async fn delete_reward(&self, owner_id: &str, reward_type: RewardType)
    -> Result<(), StoreError>;
}

/// Raw user config documents keyed by user id.
#[async_trait]
pub trait UserConfigRepository: Send + Sync {
    async fn get_document(&self, user_id: &str) -> Result<Option<String>, StoreError>;

    async fn put_document(&self, user_id: &str, document: String) -> Result<(), StoreError>;

    /// Returns whether a document existed.
    async fn delete_document(&self, user_id: &str) -> Result<bool, StoreError>;
}
