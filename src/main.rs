mod api;
mod app;
mod config;
mod db;
mod domain;
mod error;
mod logging;
mod pipeline;
mod routes;
mod services;

use anyhow::Result;

use services::{PgTenderSource, TableCache};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // A missing DB_URL stops here, before any query is attempted
    let settings = config::Settings::from_env()?;

    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        cache_ttl_secs = settings.table_cache_ttl.as_secs(),
        buckets = settings.cost_bucket_count.get(),
        "Starting Tendly dashboard service"
    );

    let pool = db::create_pool(&settings)?;
    let tables = TableCache::new(PgTenderSource::new(pool), settings.table_cache_ttl);

    // Warm the table cache; a failure here is retried by the first request
    match tables.fetch().await {
        Ok(snapshot) => tracing::info!(rows = snapshot.tenders.len(), "Tender table warmed"),
        Err(e) => tracing::warn!(error = %e, "Initial tender load failed - will retry on first request"),
    }

    let state = app::AppState::new(settings.clone(), tables);
    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
