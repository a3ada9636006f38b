use super::map_write_error;
use crate::domain::error::{AppError, Result};
use crate::domain::user::{User, UserRole};
use sqlx::SqlitePool;

pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User> {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, role) VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(role.label())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error("Failed to create user", e))?;

        self.get_user(result.last_insert_rowid()).await
    }

    pub async fn find_user(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserEntity>(
            "SELECT id, username, email, password_hash, role FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch user: {e}")))?;
        row.map(User::try_from).transpose()
    }

    pub async fn get_user(&self, id: i64) -> Result<User> {
        self.find_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found: {}", id)))
    }

    /// Looks a login identifier up against both email and username.
    pub async fn find_by_login(&self, identifier: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserEntity>(
            "SELECT id, username, email, password_hash, role FROM users
             WHERE email = ?1 OR username = ?1
             LIMIT 1",
        )
        .bind(identifier.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to look up user: {e}")))?;
        row.map(User::try_from).transpose()
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserEntity>(
            "SELECT id, username, email, password_hash, role FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list users: {e}")))?;
        rows.into_iter().map(User::try_from).collect()
    }

    pub async fn count_users(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to count users: {e}")))?;
        Ok(count)
    }

    pub async fn save_user(&self, user: &User) -> Result<User> {
        let result = sqlx::query(
            "UPDATE users SET username = ?, email = ?, password_hash = ?, role = ? WHERE id = ?",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.label())
        .bind(user.id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error("Failed to update user", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User not found: {}", user.id)));
        }
        self.get_user(user.id).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error("Failed to delete user", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User not found: {}", id)));
        }
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct UserEntity {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    role: String,
}

impl TryFrom<UserEntity> for User {
    type Error = AppError;

    fn try_from(entity: UserEntity) -> Result<Self> {
        let role = UserRole::from_label(&entity.role).ok_or_else(|| {
            AppError::DatabaseError(format!("Unknown role '{}' for user {}", entity.role, entity.id))
        })?;
        Ok(User {
            id: entity.id,
            username: entity.username,
            email: entity.email,
            role,
            password_hash: entity.password_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::test_support::TestDb;

    #[tokio::test]
    async fn test_login_lookup_by_email_or_username() {
        let db = TestDb::new().await;
        let repo = UserRepository::new(db.pool.clone());
        let user = repo
            .insert_user("Casey", "casey@example.com", "hash", UserRole::Associate1)
            .await
            .unwrap();

        let by_email = repo.find_by_login("CASEY@example.com").await.unwrap();
        assert_eq!(by_email.as_ref().map(|u| u.id), Some(user.id));

        let by_name = repo.find_by_login(" casey ").await.unwrap();
        assert_eq!(by_name.map(|u| u.role), Some(UserRole::Associate1));

        assert!(repo.find_by_login("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = TestDb::new().await;
        let repo = UserRepository::new(db.pool.clone());
        repo.insert_user("one", "same@example.com", "h", UserRole::User)
            .await
            .unwrap();

        let err = repo
            .insert_user("two", "same@example.com", "h", UserRole::User)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(repo.count_users().await.unwrap(), 1);
    }
}
