//! Database schema definitions and migrations.

use rusqlite::Connection;

use crate::DbError;

pub fn run_migrations(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS emote_adds (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    channel_twitch_id TEXT NOT NULL,
    reward_type TEXT NOT NULL,
    change_type TEXT NOT NULL,
    emote_id TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_emote_adds_channel ON emote_adds(channel_twitch_id);
CREATE INDEX IF NOT EXISTS idx_emote_adds_reward_type ON emote_adds(reward_type);
CREATE INDEX IF NOT EXISTS idx_emote_adds_change_type ON emote_adds(change_type);
CREATE INDEX IF NOT EXISTS idx_emote_adds_updated ON emote_adds(updated_at DESC, id DESC);

CREATE TABLE IF NOT EXISTS channel_point_rewards (
    owner_twitch_id TEXT NOT NULL,
    reward_type TEXT NOT NULL,
    reward_id TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    enabled BOOLEAN NOT NULL DEFAULT false,
    additional_options TEXT NOT NULL DEFAULT '{}',
    updated_at INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (owner_twitch_id, reward_type)
);

CREATE INDEX IF NOT EXISTS idx_channel_point_rewards_reward_id ON channel_point_rewards(reward_id);

CREATE TABLE IF NOT EXISTS user_configs (
    user_id TEXT PRIMARY KEY,
    config TEXT NOT NULL,
    updated_at INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS user_tokens (
    user_id TEXT PRIMARY KEY,
    login TEXT NOT NULL DEFAULT '',
    access_token TEXT NOT NULL,
    refresh_token TEXT NOT NULL,
    scope TEXT NOT NULL DEFAULT '',
    expires_at INTEGER NOT NULL DEFAULT 0
);
"#;
