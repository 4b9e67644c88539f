//! Pool construction and health checking.
//!
//! The engine never owns the pool lifecycle: the process entry point opens
//! it, hands it to the components, and closes it on shutdown.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::error::{CoreError, Result};

/// Open a Postgres pool against `database_url` and verify connectivity.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
        .map_err(|e| CoreError::Database(format!("failed to connect to Postgres: {e}")))?;

    health_check(&pool).await?;
    info!("connected to Postgres");
    Ok(pool)
}

/// Cheap liveness probe used at startup and by the health endpoint.
pub async fn health_check(pool: &PgPool) -> Result<()> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(|e| CoreError::Database(format!("health check failed: {e}")))?;
    Ok(())
}
