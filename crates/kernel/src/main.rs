//! Gridwire reference server.
//!
//! Serves the employees grid over HTTP, backed by PostgreSQL.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use gridwire_kernel::config::Config;
use gridwire_kernel::state::AppState;
use gridwire_kernel::{db, serve};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting Gridwire kernel");

    let config = Config::from_env().context("failed to load configuration")?;
    info!(port = config.port, "Configuration loaded");

    let pool = db::create_pool(&config)
        .await
        .context("failed to initialize database pool")?;
    info!("Database connection established");

    db::ensure_schema(&pool)
        .await
        .context("failed to prepare database schema")?;

    let state = AppState::new(&config, pool).context("failed to initialize application state")?;

    serve(config, state).await
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
