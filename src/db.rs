use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;
use tracing::info;

use crate::config::AppConfig;
use crate::shared::AppError;

/// Opens the MySQL pool and applies pending migrations
pub async fn connect(database_url: &str, config: &AppConfig) -> Result<MySqlPool, AppError> {
    let pool = MySqlPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await?;
    info!(
        max_connections = config.database_max_connections,
        "Connected to MySQL"
    );

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("failed to apply migrations: {}", e)))?;
    info!("Database migrations applied");

    Ok(pool)
}
