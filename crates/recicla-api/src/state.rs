//! Application state management

use crate::auth::jwt::{JwtConfig, JwtError};
use recicla_core::config::AppConfig;
use sqlx::SqlitePool;
use std::time::Instant;

/// Application state shared across handlers
///
/// Everything here is read-only after startup; the pool handles its own
/// synchronization.
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Database connection pool
    pub db: SqlitePool,
    /// Token signing configuration derived from `config.auth`
    pub jwt: JwtConfig,
    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Create application state from config and an open pool
    ///
    /// Fails when the configured JWT algorithm cannot be used with a shared
    /// secret.
    pub fn new(config: AppConfig, db: SqlitePool) -> Result<Self, JwtError> {
        let jwt = JwtConfig::from_auth_config(&config.auth)?;
        Ok(Self {
            config,
            db,
            jwt,
            start_time: Instant::now(),
        })
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
