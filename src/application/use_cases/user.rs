use crate::domain::error::{AppError, Result};
use crate::domain::user::{
    LoginRequest, LoginResponse, NewUserInput, Session, User, UserPatch, UserRole,
};
use crate::infrastructure::config::DefaultAdminConfig;
use crate::infrastructure::db::sessions::SessionRepository;
use crate::infrastructure::db::users::UserRepository;
use crate::infrastructure::security::password::{
    generate_token, hash_password, hash_token, verify_password,
};
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct UserUseCase {
    users: Arc<UserRepository>,
    sessions: Arc<SessionRepository>,
    token_ttl_hours: i64,
}

impl UserUseCase {
    pub fn new(
        users: Arc<UserRepository>,
        sessions: Arc<SessionRepository>,
        token_ttl_hours: i64,
    ) -> Self {
        Self {
            users,
            sessions,
            token_ttl_hours,
        }
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse> {
        request.validate()?;
        let user = self
            .users
            .find_by_login(&request.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;
        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let now = chrono::Utc::now().timestamp_millis();
        if let Err(err) = self.sessions.purge_expired(now).await {
            warn!(error = %err, "Failed to purge expired sessions");
        }

        let token = generate_token();
        let session = Session {
            token_hash: hash_token(&token),
            user_id: user.id,
            created_at: now,
            expires_at: now + self.token_ttl_hours * 60 * 60 * 1000,
        };
        self.sessions.insert_session(&session).await?;
        info!(user_id = user.id, "User logged in");

        Ok(LoginResponse {
            token,
            user,
            expires_at: session.expires_at,
        })
    }

    /// Resolves a bearer token to its user.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let now = chrono::Utc::now().timestamp_millis();
        let session = self
            .sessions
            .find_active(&hash_token(token), now)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Session expired or invalid".to_string()))?;
        self.users
            .find_user(session.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Session expired or invalid".to_string()))
    }

    pub async fn logout(&self, token: &str) -> Result<()> {
        self.sessions.delete_session(&hash_token(token)).await
    }

    pub async fn create_user(&self, input: NewUserInput) -> Result<User> {
        input.validate()?;
        let user = self
            .users
            .insert_user(
                input.username.trim(),
                input.email.trim(),
                &hash_password(&input.password)?,
                input.role,
            )
            .await?;
        info!(user_id = user.id, role = %user.role, "User created");
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.users.list_users().await
    }

    pub async fn get_user(&self, id: i64) -> Result<User> {
        self.users.get_user(id).await
    }

    pub async fn update_user(&self, id: i64, patch: UserPatch) -> Result<User> {
        patch.validate()?;
        let mut user = self.users.get_user(id).await?;
        if let Some(username) = patch.username {
            user.username = username.trim().to_string();
        }
        if let Some(email) = patch.email {
            user.email = email.trim().to_string();
        }
        if let Some(password) = patch.password {
            user.password_hash = hash_password(&password)?;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        self.users.save_user(&user).await
    }

    pub async fn delete_user(&self, id: i64, acting: &User) -> Result<()> {
        if acting.id == id {
            return Err(AppError::ValidationError(
                "You cannot delete your own account".to_string(),
            ));
        }
        self.users.delete_user(id).await?;
        info!(user_id = id, deleted_by = acting.id, "User deleted");
        Ok(())
    }

    /// Creates the configured administrator when no user exists yet.
    pub async fn seed_default_admin(&self, admin: &DefaultAdminConfig) -> Result<Option<User>> {
        if self.users.count_users().await? > 0 {
            return Ok(None);
        }
        let user = self
            .users
            .insert_user(
                &admin.username,
                &admin.email,
                &hash_password(&admin.password)?,
                UserRole::Admin,
            )
            .await?;
        warn!(
            email = %user.email,
            "Created default administrator; change its password"
        );
        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::test_support::TestDb;

    fn use_case(db: &TestDb, ttl_hours: i64) -> UserUseCase {
        UserUseCase::new(
            Arc::new(UserRepository::new(db.pool.clone())),
            Arc::new(SessionRepository::new(db.pool.clone())),
            ttl_hours,
        )
    }

    fn admin_config() -> DefaultAdminConfig {
        DefaultAdminConfig {
            username: "Admin".to_string(),
            email: "admin@example.com".to_string(),
            password: "Admin5656".to_string(),
        }
    }

    #[tokio::test]
    async fn test_seed_runs_once() {
        let db = TestDb::new().await;
        let users = use_case(&db, 8);
        let seeded = users.seed_default_admin(&admin_config()).await.unwrap();
        assert!(seeded.unwrap().is_admin());
        assert!(users.seed_default_admin(&admin_config()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_authenticate_logout() {
        let db = TestDb::new().await;
        let users = use_case(&db, 8);
        users.seed_default_admin(&admin_config()).await.unwrap();

        let login = users
            .login(LoginRequest {
                email: "Admin".to_string(),
                password: "Admin5656".to_string(),
            })
            .await
            .unwrap();
        let current = users.authenticate(&login.token).await.unwrap();
        assert_eq!(current.email, "admin@example.com");

        users.logout(&login.token).await.unwrap();
        assert!(matches!(
            users.authenticate(&login.token).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_wrong_password_and_expired_token() {
        let db = TestDb::new().await;
        let users = use_case(&db, 0);
        users.seed_default_admin(&admin_config()).await.unwrap();

        let err = users
            .login(LoginRequest {
                email: "admin@example.com".to_string(),
                password: "wrong".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.message(), INVALID_CREDENTIALS);

        let login = users
            .login(LoginRequest {
                email: "admin@example.com".to_string(),
                password: "Admin5656".to_string(),
            })
            .await
            .unwrap();
        assert!(matches!(
            users.authenticate(&login.token).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_update_rehashes_password_and_blocks_self_delete() {
        let db = TestDb::new().await;
        let users = use_case(&db, 8);
        let admin = users.seed_default_admin(&admin_config()).await.unwrap().unwrap();
        let associate = users
            .create_user(NewUserInput {
                username: "jamie".to_string(),
                email: "jamie@example.com".to_string(),
                password: "first-pass".to_string(),
                role: UserRole::Associate2,
            })
            .await
            .unwrap();

        users
            .update_user(
                associate.id,
                UserPatch {
                    password: Some("second-pass".to_string()),
                    ..UserPatch::default()
                },
            )
            .await
            .unwrap();
        assert!(users
            .login(LoginRequest {
                email: "jamie".to_string(),
                password: "second-pass".to_string(),
            })
            .await
            .is_ok());

        assert!(matches!(
            users.delete_user(admin.id, &admin).await,
            Err(AppError::ValidationError(_))
        ));
        users.delete_user(associate.id, &admin).await.unwrap();
        assert_eq!(users.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_deleting_lead_owner_keeps_their_leads() {
        let db = TestDb::new().await;
        let users = use_case(&db, 8);
        let admin = users.seed_default_admin(&admin_config()).await.unwrap().unwrap();
        let associate = users
            .create_user(NewUserInput {
                username: "casey".to_string(),
                email: "casey@example.com".to_string(),
                password: "casey-pass".to_string(),
                role: UserRole::Associate1,
            })
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO leads (lead_id, month, name, phone_number, created_by, created_date, updated_date)
             VALUES ('LD0001', '2024-09-01', 'A', '1', ?, 0, 0)",
        )
        .bind(associate.id)
        .execute(&db.pool)
        .await
        .unwrap();

        users.delete_user(associate.id, &admin).await.unwrap();

        let (owner,): (Option<i64>,) =
            sqlx::query_as("SELECT created_by FROM leads WHERE lead_id = 'LD0001'")
                .fetch_one(&db.pool)
                .await
                .unwrap();
        assert_eq!(owner, None);
    }
}
