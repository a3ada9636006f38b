pub mod connection;
pub mod counters;
pub mod lead_categories;
pub mod leads;
pub mod sessions;
pub mod users;
pub mod vehicles;

use crate::domain::error::AppError;
use chrono::NaiveDate;

/// Wraps a write failure, surfacing unique-constraint violations as
/// validation errors so callers can report them as bad input.
pub(crate) fn map_write_error(context: &str, err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AppError::ValidationError(format!(
                "{}: duplicate value ({})",
                context,
                db_err.message()
            ));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::ValidationError(format!(
                "{}: missing or still-referenced related record",
                context
            ));
        }
    }
    AppError::DatabaseError(format!("{}: {}", context, err))
}

/// Upper bound on bind parameters per `IN (...)` list; longer id lists are
/// queried in chunks of this size.
pub(crate) const IN_LIST_CHUNK: usize = 500;

pub(crate) fn encode_list(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

pub(crate) fn decode_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

pub(crate) fn encode_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

pub(crate) fn decode_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|value| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::connection::init_pool;
    use sqlx::SqlitePool;
    use std::path::PathBuf;

    /// File-backed database in the temp dir, so that concurrent connections
    /// share state the way they do in production.
    pub struct TestDb {
        pub pool: SqlitePool,
        path: PathBuf,
    }

    impl TestDb {
        pub async fn new() -> Self {
            let path = std::env::temp_dir()
                .join(format!("dealerdesk-test-{}.db", uuid::Uuid::new_v4()));
            let pool = init_pool(&path, 8).await.expect("test database");
            Self { pool, path }
        }

        /// Inserts a bare user so leads have an owner.
        pub async fn seed_user(&self, username: &str) -> i64 {
            let result = sqlx::query(
                "INSERT INTO users (username, email, password_hash, role) VALUES (?, ?, 'x', 'User')",
            )
            .bind(username)
            .bind(format!("{}@example.com", username))
            .execute(&self.pool)
            .await
            .expect("seed user");
            result.last_insert_rowid()
        }
    }

    impl Drop for TestDb {
        fn drop(&mut self) {
            for suffix in ["", "-wal", "-shm"] {
                let mut file = self.path.clone().into_os_string();
                file.push(suffix);
                let _ = std::fs::remove_file(PathBuf::from(file));
            }
        }
    }
}
