use crate::domain::error::{AppError, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const CONFIG_FILE: &str = "dealerdesk.toml";
pub const ENV_PREFIX: &str = "DEALERDESK_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub log_level: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub uploads: UploadConfig,
    pub import: ImportConfig,
    pub sms: SmsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Defaults to the number of physical cores when unset.
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub token_ttl_hours: i64,
    pub default_admin: DefaultAdminConfig,
}

/// Account created on first start when the user table is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultAdminConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_file_size_bytes: usize,
}

/// Lead spreadsheets carry a bare month name. Months from `season_start_month`
/// onwards belong to `season_start_year`, earlier months to the year after.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImportConfig {
    pub season_start_year: i32,
    pub season_start_month: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmsConfig {
    pub twilio: Option<TwilioConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    #[serde(default = "default_twilio_base_url")]
    pub base_url: String,
}

fn default_twilio_base_url() -> String {
    "https://api.twilio.com/2010-04-01".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5050,
                workers: None,
            },
            database: DatabaseConfig {
                path: PathBuf::from("data/dealerdesk.db"),
                max_connections: 8,
            },
            auth: AuthConfig {
                token_ttl_hours: 8,
                default_admin: DefaultAdminConfig {
                    username: "Admin".to_string(),
                    email: "admin@example.com".to_string(),
                    password: "Admin5656".to_string(),
                },
            },
            uploads: UploadConfig {
                dir: PathBuf::from("uploads/files"),
                max_file_size_bytes: 10 * 1024 * 1024,
            },
            import: ImportConfig {
                season_start_year: 2024,
                season_start_month: 8,
            },
            sms: SmsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults, then `dealerdesk.toml`, then `DEALERDESK_*` variables
    /// (`DEALERDESK_SERVER__PORT=8080`). A `.env` file is loaded first.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_figment(
            Figment::from(Serialized::defaults(AppConfig::default()))
                .merge(Toml::file(CONFIG_FILE))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: AppConfig = figment
            .extract()
            .map_err(|e| AppError::Internal(format!("Failed to load configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(1..=12).contains(&self.import.season_start_month) {
            return Err(AppError::ValidationError(format!(
                "import.season_start_month must be 1-12, got {}",
                self.import.season_start_month
            )));
        }
        if self.auth.token_ttl_hours <= 0 {
            return Err(AppError::ValidationError(
                "auth.token_ttl_hours must be positive".to_string(),
            ));
        }
        if self.uploads.max_file_size_bytes == 0 {
            return Err(AppError::ValidationError(
                "uploads.max_file_size_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
