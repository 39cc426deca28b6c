//! Raw per-user configuration documents.
//!
//! The document is stored as an opaque JSON string. Decoding and the
//! protected-field merge live with the caller.

use crate::{Database, DbError, OptionalExt, now_millis};

impl Database {
    pub fn get_user_config(&self, user_id: &str) -> Result<Option<String>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT config FROM user_configs WHERE user_id = ?1")?;
            let value = stmt
                .query_row([user_id], |row| row.get::<_, String>(0))
                .optional()?;
            Ok(value)
        })
    }

    pub fn set_user_config(&self, user_id: &str, config: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO user_configs (user_id, config, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(user_id) DO UPDATE SET config = ?2, updated_at = ?3",
                rusqlite::params![user_id, config, now_millis()],
            )?;
            Ok(())
        })
    }

    /// Returns whether a document was removed.
    pub fn delete_user_config(&self, user_id: &str) -> Result<bool, DbError> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM user_configs WHERE user_id = ?1", [user_id])?;
            Ok(removed > 0)
        })
    }
}
