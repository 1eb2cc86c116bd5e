//! MySQL connection pool management

use std::time::Duration;

use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::InfrastructureError;

/// Create a MySQL connection pool from configuration
pub async fn connect_pool(config: &DatabaseConfig) -> Result<MySqlPool, InfrastructureError> {
    info!(
        max_connections = config.max_connections,
        "creating mysql connection pool"
    );

    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout))
        .connect(&config.url)
        .await?;

    // Fail fast if the database is unreachable
    sqlx::query("SELECT 1").execute(&pool).await?;

    info!("mysql connection pool ready");
    Ok(pool)
}
