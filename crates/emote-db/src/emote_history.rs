//! Append-only emote history ledger.
//!
//! Rows are only ever inserted. Every read orders by `updated_at DESC, id DESC`
//! so that records created within the same millisecond still come back in
//! insertion order.

use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::{Database, DbError, EmoteChangeType, OptionalExt, RewardType, now_millis};

/// One recorded emote change for a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmoteAdd {
    pub id: i64,
    pub channel_twitch_id: String,
    pub reward_type: RewardType,
    pub change_type: EmoteChangeType,
    pub emote_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

const SELECT_COLUMNS: &str =
    "SELECT id, channel_twitch_id, reward_type, change_type, emote_id, created_at, updated_at
     FROM emote_adds";

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        message.into(),
    )
}

fn row_to_emote_add(row: &Row<'_>) -> Result<EmoteAdd, rusqlite::Error> {
    let reward_type: String = row.get(2)?;
    let change_type: String = row.get(3)?;
    Ok(EmoteAdd {
        id: row.get(0)?,
        channel_twitch_id: row.get(1)?,
        reward_type: reward_type.parse().map_err(|e| conversion_error(2, e))?,
        change_type: change_type.parse().map_err(|e| conversion_error(3, e))?,
        emote_id: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

impl Database {
    /// Insert one history record with server-assigned timestamps.
    pub fn create_emote_add(
        &self,
        channel_twitch_id: &str,
        reward_type: RewardType,
        emote_id: &str,
        change_type: EmoteChangeType,
    ) -> Result<EmoteAdd, DbError> {
        self.with_conn(|conn| {
            let now = now_millis();
            conn.execute(
                "INSERT INTO emote_adds
                    (channel_twitch_id, reward_type, change_type, emote_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                rusqlite::params![
                    channel_twitch_id,
                    reward_type.as_str(),
                    change_type.as_str(),
                    emote_id,
                    now,
                ],
            )?;
            Ok(EmoteAdd {
                id: conn.last_insert_rowid(),
                channel_twitch_id: channel_twitch_id.to_string(),
                reward_type,
                change_type,
                emote_id: emote_id.to_string(),
                created_at: now,
                updated_at: now,
            })
        })
    }

    /// Most recent records of `change_type` for a channel and reward type.
    pub fn get_emote_changes(
        &self,
        channel_twitch_id: &str,
        reward_type: RewardType,
        change_type: EmoteChangeType,
        limit: i64,
    ) -> Result<Vec<EmoteAdd>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS}
                 WHERE channel_twitch_id = ?1 AND reward_type = ?2 AND change_type = ?3
                 ORDER BY updated_at DESC, id DESC
                 LIMIT ?4"
            ))?;
            let rows = stmt.query_map(
                rusqlite::params![
                    channel_twitch_id,
                    reward_type.as_str(),
                    change_type.as_str(),
                    limit.max(0),
                ],
                row_to_emote_add,
            )?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
        })
    }

    /// Most recent `add` records for a channel and reward type.
    pub fn get_emote_added(
        &self,
        channel_twitch_id: &str,
        reward_type: RewardType,
        limit: i64,
    ) -> Result<Vec<EmoteAdd>, DbError> {
        self.get_emote_changes(channel_twitch_id, reward_type, EmoteChangeType::Add, limit)
    }

    /// Number of added emotes that have not been removed since.
    pub fn count_active_emotes(
        &self,
        channel_twitch_id: &str,
        reward_type: RewardType,
    ) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM emote_adds a
                 WHERE a.channel_twitch_id = ?1 AND a.reward_type = ?2 AND a.change_type = 'add'
                   AND NOT EXISTS (
                       SELECT 1 FROM emote_adds r
                       WHERE r.channel_twitch_id = a.channel_twitch_id
                         AND r.reward_type = a.reward_type
                         AND r.emote_id = a.emote_id
                         AND r.change_type != 'add'
                         AND r.id > a.id
                   )",
                rusqlite::params![channel_twitch_id, reward_type.as_str()],
                |row| row.get::<_, i64>(0),
            )?;
            Ok(count)
        })
    }

    /// Whether `emote_id` was added and not removed since.
    pub fn is_emote_active(
        &self,
        channel_twitch_id: &str,
        reward_type: RewardType,
        emote_id: &str,
    ) -> Result<bool, DbError> {
        self.with_conn(|conn| {
            let latest: Option<String> = conn
                .query_row(
                    "SELECT change_type FROM emote_adds
                     WHERE channel_twitch_id = ?1 AND reward_type = ?2 AND emote_id = ?3
                     ORDER BY id DESC LIMIT 1",
                    rusqlite::params![channel_twitch_id, reward_type.as_str(), emote_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(latest.as_deref() == Some(EmoteChangeType::Add.as_str()))
        })
    }

    /// One page of a channel's history. `page` is 1-based; pages below 1
/// read as 1.
    ///
    /// `added = true` returns only `add` records, `false` everything else.
    pub fn get_emote_history(
        &self,
        channel_twitch_id: &str,
        page: i64,
        page_size: i64,
        added: bool,
    ) -> Result<Vec<EmoteAdd>, DbError> {
        let page = page.max(1);
        let page_size = page_size.max(0);
        // pages past the addressable range are empty
        let Some(offset) = (page - 1).checked_mul(page_size) else {
            return Ok(Vec::new());
        };
        let filter = if added {
            "change_type = 'add'"
        } else {
            "change_type != 'add'"
        };

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS}
                 WHERE channel_twitch_id = ?1 AND {filter}
                 ORDER BY updated_at DESC, id DESC
                 LIMIT ?2 OFFSET ?3"
            ))?;
            let rows = stmt.query_map(
                rusqlite::params![channel_twitch_id, page_size, offset],
                row_to_emote_add,
            )?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
        })
    }
}
