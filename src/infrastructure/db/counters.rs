use crate::domain::error::{AppError, Result};
use crate::domain::sequence::SequenceKind;
use async_trait::async_trait;
use sqlx::SqlitePool;

/// Source of monotonically increasing sequence values.
///
/// Implementations must perform the increment as one atomic operation in the
/// store; two concurrent callers can never observe the same value.
#[async_trait]
pub trait SequenceCounter: Send + Sync {
    /// Increments the counter `name` (creating it at zero) and returns the
    /// new value.
    async fn next_value(&self, name: &str) -> Result<i64>;

    /// Mints the next public id for `kind`, e.g. `LD0042`.
    async fn next_id(&self, kind: SequenceKind) -> Result<String> {
        let value = self.next_value(kind.counter_name()).await?;
        Ok(kind.format(value))
    }
}

pub struct CounterRepository {
    pool: SqlitePool,
}

impl CounterRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn current_value(&self, name: &str) -> Result<i64> {
        let value: Option<(i64,)> =
            sqlx::query_as("SELECT sequence_value FROM counters WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to read counter: {e}")))?;
        Ok(value.map(|(v,)| v).unwrap_or(0))
    }
}

#[async_trait]
impl SequenceCounter for CounterRepository {
    async fn next_value(&self, name: &str) -> Result<i64> {
        // Single upsert statement: SQLite takes the write lock before reading
        // the row, so the increment and the returned value cannot interleave.
        let (value,): (i64,) = sqlx::query_as(
            "INSERT INTO counters (name, sequence_value) VALUES (?, 1)
             ON CONFLICT(name) DO UPDATE SET sequence_value = sequence_value + 1
             RETURNING sequence_value",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to increment counter {name}: {e}")))?;

        Ok(value)
    }
}
