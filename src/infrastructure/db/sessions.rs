use super::map_write_error;
use crate::domain::error::{AppError, Result};
use crate::domain::user::Session;
use sqlx::SqlitePool;

pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert_session(&self, session: &Session) -> Result<()> {
        sqlx::query(
            "INSERT INTO sessions (token_hash, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&session.token_hash)
        .bind(session.user_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error("Failed to store session", e))?;
        Ok(())
    }

    /// Session for `token_hash` that is still valid at `now`.
    pub async fn find_active(&self, token_hash: &str, now: i64) -> Result<Option<Session>> {
        let row: Option<(String, i64, i64, i64)> = sqlx::query_as(
            "SELECT token_hash, user_id, created_at, expires_at FROM sessions
             WHERE token_hash = ? AND expires_at > ?",
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch session: {e}")))?;

        Ok(row.map(|(token_hash, user_id, created_at, expires_at)| Session {
            token_hash,
            user_id,
            created_at,
            expires_at,
        }))
    }

    pub async fn delete_session(&self, token_hash: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete session: {e}")))?;
        Ok(())
    }

    pub async fn purge_expired(&self, now: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to purge sessions: {e}")))?;
        Ok(result.rows_affected())
    }
}
