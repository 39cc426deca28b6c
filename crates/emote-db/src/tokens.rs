//! Per-user OAuth token storage.

use serde::{Deserialize, Serialize};

use crate::{Database, DbError, OptionalExt};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserToken {
    pub user_id: String,
    pub login: String,
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_at: i64,
}

impl Database {
    pub fn save_user_token(&self, token: &UserToken) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO user_tokens (user_id, login, access_token, refresh_token, scope, expires_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(user_id) DO UPDATE SET
                    login = ?2, access_token = ?3, refresh_token = ?4, scope = ?5, expires_at = ?6",
                rusqlite::params![
                    token.user_id,
                    token.login,
                    token.access_token,
                    token.refresh_token,
                    token.scope,
                    token.expires_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_user_token(&self, user_id: &str) -> Result<Option<UserToken>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, login, access_token, refresh_token, scope, expires_at
                 FROM user_tokens WHERE user_id = ?1",
            )?;
            let token = stmt
                .query_row([user_id], |row| {
                    Ok(UserToken {
                        user_id: row.get(0)?,
                        login: row.get(1)?,
                        access_token: row.get(2)?,
                        refresh_token: row.get(3)?,
                        scope: row.get(4)?,
                        expires_at: row.get(5)?,
                    })
                })
                .optional()?;
            Ok(token)
        })
    }

    pub fn delete_user_token(&self, user_id: &str) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM user_tokens WHERE user_id = ?1", [user_id])?;
            Ok(())
        })
    }
}
