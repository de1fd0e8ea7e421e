//! Database connection pool management

use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use std::str::FromStr;
use std::time::Duration;

use crate::config::Settings;
use crate::error::DashboardError;

/// Create a lazily connecting PostgreSQL pool.
///
/// A malformed URL fails here; an unreachable server only surfaces when the
/// loader first acquires a connection.
pub fn create_pool(settings: &Settings) -> Result<PgPool, DashboardError> {
    let connect_options = PgConnectOptions::from_str(&settings.database_url)
        .map_err(|e| DashboardError::Configuration(format!("Invalid DB_URL: {e}")))?
        .application_name("tendly-dashboard");

    let pool = PgPoolOptions::new()
        .max_connections(settings.database_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .connect_lazy_with(connect_options);

    tracing::info!(
        max_connections = settings.database_max_connections,
        "Database connection pool configured"
    );

    Ok(pool)
}

/// Lightweight health check for database connectivity
pub async fn health_check(pool: &PgPool) -> bool {
    sqlx::query("SELECT 1").fetch_one(pool).await.is_ok()
}
