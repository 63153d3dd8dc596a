//! Ser Recicla API Server

use anyhow::Context;
use recicla_api::{create_router, db, state::AppState};
use recicla_core::{AppConfig, LoggingConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "recicla_api={level},recicla_core={level},audit=info,tower_http={level}",
            level = logging.level
        ))
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    if config.is_development() {
        tracing::warn!("Running in development mode; do not use the default secret key in production");
    }

    let pool = db::connect(&config.database)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.url))?;
    db::run_migrations(&pool)
        .await
        .context("Failed to apply database migrations")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, pool).context("Invalid auth configuration")?);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Ser Recicla API starting on http://{}", addr);
    tracing::info!("OpenAPI spec at http://{}/api/v1/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
