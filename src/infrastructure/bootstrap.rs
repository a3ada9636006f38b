use std::sync::Arc;

use tracing::{error, info, warn};

use crate::application::{
    LeadCategoryUseCase, LeadUseCase, SmsUseCase, UserUseCase, VehicleUseCase,
};
use crate::domain::error::Result;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::connection::init_pool;
use crate::infrastructure::db::counters::{CounterRepository, SequenceCounter};
use crate::infrastructure::db::lead_categories::LeadCategoryRepository;
use crate::infrastructure::db::leads::LeadRepository;
use crate::infrastructure::db::sessions::SessionRepository;
use crate::infrastructure::db::users::UserRepository;
use crate::infrastructure::db::vehicles::VehicleRepository;
use crate::infrastructure::sms::{SmsSender, TwilioClient};
use crate::infrastructure::storage::{ensure_database_dir, ensure_upload_dir};
use crate::interfaces::http::{HttpState, UploadSettings};

/// Prepares directories and the database, then wires repositories into the
/// use cases served over HTTP.
pub async fn setup(config: &AppConfig) -> Result<HttpState> {
    ensure_database_dir(&config.database.path).map_err(|err| {
        error!(
            error = %err,
            database = %config.database.path.display(),
            "Failed to create database dir"
        );
        err
    })?;
    ensure_upload_dir(&config.uploads.dir).map_err(|err| {
        error!(
            error = %err,
            upload_dir = %config.uploads.dir.display(),
            "Failed to create upload dir"
        );
        err
    })?;

    let pool = init_pool(&config.database.path, config.database.max_connections)
        .await
        .map_err(|err| {
            error!(error = %err, "Failed to initialize database");
            err
        })?;
    info!(database = %config.database.path.display(), "Database ready");

    let leads = Arc::new(LeadRepository::new(pool.clone()));
    let categories = Arc::new(LeadCategoryRepository::new(pool.clone()));
    let vehicles = Arc::new(VehicleRepository::new(pool.clone()));
    let counter: Arc<dyn SequenceCounter> = Arc::new(CounterRepository::new(pool.clone()));

    let users = Arc::new(UserUseCase::new(
        Arc::new(UserRepository::new(pool.clone())),
        Arc::new(SessionRepository::new(pool)),
        config.auth.token_ttl_hours,
    ));
    if let Err(err) = users.seed_default_admin(&config.auth.default_admin).await {
        error!(error = %err, "Failed to seed default administrator");
        return Err(err);
    }

    let sender: Option<Arc<dyn SmsSender>> = match config.sms.twilio.clone() {
        Some(twilio) => Some(Arc::new(TwilioClient::new(twilio))),
        None => {
            warn!("No SMS provider configured; SMS sending is disabled");
            None
        }
    };

    Ok(HttpState {
        leads: Arc::new(LeadUseCase::new(
            leads.clone(),
            categories.clone(),
            counter.clone(),
            config.import,
        )),
        categories: Arc::new(LeadCategoryUseCase::new(categories)),
        vehicles: Arc::new(VehicleUseCase::new(vehicles, counter)),
        users,
        sms: Arc::new(SmsUseCase::new(leads, sender)),
        uploads: UploadSettings {
            dir: config.uploads.dir.clone(),
            max_file_size_bytes: config.uploads.max_file_size_bytes,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_setup_creates_dirs_and_seeds_admin() {
        let root = std::env::temp_dir().join(format!("dealerdesk-setup-{}", uuid::Uuid::new_v4()));
        let mut config = AppConfig::default();
        config.database.path = root.join("data").join("app.db");
        config.uploads.dir = root.join("uploads");

        let state = setup(&config).await.unwrap();
        assert!(config.uploads.dir.is_dir());
        assert!(config.database.path.exists());

        let users = state.users.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert!(users[0].is_admin());

        // a second start must not seed again
        let state = setup(&config).await.unwrap();
        assert_eq!(state.users.list_users().await.unwrap().len(), 1);

        let _ = std::fs::remove_dir_all(PathBuf::from(&root));
    }
}
