use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::AppConfig;

pub async fn run() -> Result<()> {
    let config = AppConfig::load()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let state = crate::infrastructure::bootstrap::setup(&config).await?;
    let server = crate::interfaces::http::start_server(state, &config.server).map_err(|err| {
        error!(
            error = %err,
            host = %config.server.host,
            port = config.server.port,
            "Failed to bind HTTP server"
        );
        AppError::from(err)
    })?;

    server.await?;
    info!("HTTP server stopped");
    Ok(())
}
