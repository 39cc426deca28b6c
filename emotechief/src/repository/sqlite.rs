use async_trait::async_trait;
use emote_db::{ChannelPointReward, Database, DbError, EmoteAdd, EmoteChangeType, RewardType};

use super::{EmoteLedger, RewardRepository, StoreError, UserConfigRepository};

/// emote-db backed implementation of every repository trait.
#[derive(Clone)]
pub struct SqliteRepository {
    db: Database,
}

impl SqliteRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Run a blocking database call off the async executor.
    pub async fn blocking<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Database) -> Result<T, DbError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| StoreError::Join(e.to_string()))?
            .map_err(StoreError::from)
    }
}

#[async_trait]
impl EmoteLedger for SqliteRepository {
    async fn append(
        &self,
        channel_id: &str,
        reward_type: RewardType,
        emote_id: &str,
        change_type: EmoteChangeType,
    ) -> Result<EmoteAdd, StoreError> {
        let channel_id = channel_id.to_string();
        let emote_id = emote_id.to_string();
        self.blocking(move |db| db.create_emote_add(&channel_id, reward_type, &emote_id, change_type))
            .await
    }

    async fn query_recent(
        &self,
        channel_id: &str,
        reward_type: RewardType,
        change_type: EmoteChangeType,
        limit: i64,
    ) -> Result<Vec<EmoteAdd>, StoreError> {
        let channel_id = channel_id.to_string();
        self.blocking(move |db| db.get_emote_changes(&channel_id, reward_type, change_type, limit))
            .await
    }

    async fn active_count(
        &self,
        channel_id: &str,
        reward_type: RewardType,
    ) -> Result<i64, StoreError> {
        let channel_id = channel_id.to_string();
        self.blocking(move |db| db.count_active_emotes(&channel_id, reward_type))
            .await
    }

    async fn is_active(
        &self,
        channel_id: &str,
        reward_type: RewardType,
        emote_id: &str,
    ) -> Result<bool, StoreError> {
        let channel_id = channel_id.to_string();
        let emote_id = emote_id.to_string();
        self.blocking(move |db| db.is_emote_active(&channel_id, reward_type, &emote_id))
            .await
    }

    async fn paginate(
        &self,
        channel_id: &str,
        page: i64,
        page_size: i64,
        added_only: bool,
    ) -> Result<Vec<EmoteAdd>, StoreError> {
        let channel_id = channel_id.to_string();
        self.blocking(move |db| db.get_emote_history(&channel_id, page, page_size, added_only))
            .await
    }
}

#[async_trait]
impl RewardRepository for SqliteRepository {
    async fn save_reward(&self, reward: ChannelPointReward) -> Result<(), StoreError> {
        self.blocking(move |db| db.save_reward(&reward)).await
    }

    async fn get_reward(
        &self,
        owner_id: &str,
        reward_type: RewardType,
    ) -> Result<Option<ChannelPointReward>, StoreError> {
        let owner_id = owner_id.to_string();
        self.blocking(move |db| db.get_reward(&owner_id, reward_type))
            .await
    }

    async fn get_reward_by_id(
        &self,
        owner_id: &str,
        reward_id: &str,
    ) -> Result<Option<ChannelPointReward>, StoreError> {
        let owner_id = owner_id.to_string();
        let reward_id = reward_id.to_string();
        self.blocking(move |db| db.get_reward_by_id(&owner_id, &reward_id))
            .await
    }

    async fn list_rewards(&self, owner_id: &str) -> Result<Vec<ChannelPointReward>, StoreError> {
        let owner_id = owner_id.to_string();
        self.blocking(move |db| db.get_rewards(&owner_id)).await
    }

    async fn delete_reward(
        &self,
        owner_id: &str,
        reward_type: RewardType,
    ) -> Result<(), StoreError> {
        let owner_id = owner_id.to_string();
        self.blocking(move |db| db.delete_reward(&owner_id, reward_type))
            .await
    }
}

#[async_trait]
impl UserConfigRepository for SqliteRepository {
    async fn get_document(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        let user_id = user_id.to_string();
        self.blocking(move |db| db.get_user_config(&user_id)).await
    }

    async fn put_document(&self, user_id: &str, document: String) -> Result<(), StoreError> {
        let user_id = user_id.to_string();
        self.blocking(move |db| db.set_user_config(&user_id, &document))
            .await
    }

    async fn delete_document(&self, user_id: &str) -> Result<bool, StoreError> {
        let user_id = user_id.to_string();
        self.blocking(move |db| db.delete_user_config(&user_id))
            .await
    }
}
