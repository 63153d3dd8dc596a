//! Ser Recicla configuration management
//!
//! Handles configuration from environment variables and an optional TOML
//! file, with defaults suitable for local development.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Longest accepted access-token lifetime (one week)
pub const MAX_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 7 * 24 * 60;

/// Longest accepted refresh-token lifetime (ten years)
pub const MAX_REFRESH_TOKEN_EXPIRE_DAYS: i64 = 10 * 365;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Project name reported by the root endpoint
    pub project_name: String,

    /// Deployment environment (development, production, ...)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database connection
    pub database: DatabaseConfig,

    /// Token and cookie settings
    pub auth: AuthConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            project_name: "Ser Recicla API".to_string(),
            environment: "development".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_override()
    }

    /// Load configuration from `RECICLA_CONFIG` if set, then apply the environment
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var("RECICLA_CONFIG") {
            Ok(path) => Self::from_file(path)?.with_env_override(),
            Err(_) => Self::from_env(),
        }
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Apply environment variables on top of the current values (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        if let Ok(env) = std::env::var("ENVIRONMENT") {
            self.environment = env;
        }

        // Server
        if let Ok(host) = std::env::var("API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = parse_env("API_PORT")? {
            self.server.port = port;
        }
        if let Ok(origins) = std::env::var("CORS_ORIGINS") {
            self.server.cors_origins = parse_origins(&origins);
        }

        // Database
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(max) = parse_env("DATABASE_MAX_CONNECTIONS")? {
            self.database.max_connections = max;
        }

        // Auth
        if let Ok(secret) = std::env::var("JWT_SECRET_KEY").or_else(|_| std::env::var("SECRET_KEY")) {
            self.auth.secret_key = secret;
        }
        if let Ok(algorithm) = std::env::var("JWT_ALGORITHM") {
            self.auth.algorithm = algorithm;
        }
        if let Some(minutes) = parse_env("ACCESS_TOKEN_EXPIRE_MINUTES")? {
            self.auth.access_token_expire_minutes = minutes;
        }
        if let Some(days) = parse_env("REFRESH_TOKEN_EXPIRE_DAYS")? {
            self.auth.refresh_token_expire_days = days;
        }
        if let Some(secure) = parse_env("COOKIE_SECURE")? {
            self.auth.cookie_secure = secure;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = parse_env("LOG_JSON")? {
            self.logging.json_format = json;
        }

        self.validate()?;
        Ok(self)
    }

    /// Check values that would otherwise only fail at first use
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.secret_key.is_empty() {
            return Err(ConfigError::MissingRequired("JWT_SECRET_KEY".to_string()));
        }
        if !(1..=MAX_ACCESS_TOKEN_EXPIRE_MINUTES).contains(&self.auth.access_token_expire_minutes) {
            return Err(ConfigError::InvalidValue {
                key: "ACCESS_TOKEN_EXPIRE_MINUTES".to_string(),
                value: self.auth.access_token_expire_minutes.to_string(),
            });
        }
        if !(1..=MAX_REFRESH_TOKEN_EXPIRE_DAYS).contains(&self.auth.refresh_token_expire_days) {
            return Err(ConfigError::InvalidValue {
                key: "REFRESH_TOKEN_EXPIRE_DAYS".to_string(),
                value: self.auth.refresh_token_expire_days.to_string(),
            });
        }
        Ok(())
    }

    /// Whether the server runs in the development environment
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}

fn parse_env<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

/// Split a comma-separated origin list, dropping blanks
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed origins for CORS
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    /// Connection pool size
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://serrecicla.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

/// Token signing and refresh-cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret used to sign tokens
    pub secret_key: String,

    /// JWT algorithm name (HS256, HS384 or HS512)
    pub algorithm: String,

    /// Access token lifetime in minutes
    pub access_token_expire_minutes: i64,

    /// Refresh token lifetime in days
    pub refresh_token_expire_days: i64,

    /// Set the Secure flag on the refresh cookie
    pub cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: "your_jwt_secret_key".to_string(),
            algorithm: "HS256".to_string(),
            access_token_expire_minutes: 15,
            refresh_token_expire_days: 15,
            cookie_secure: false,
        }
    }
}

impl AuthConfig {
    /// Refresh lifetime in seconds, used as the cookie Max-Age
    pub fn refresh_max_age_secs(&self) -> i64 {
        self.refresh_token_expire_days.saturating_mul(24 * 60 * 60)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.auth.algorithm, "HS256");
        assert_eq!(config.auth.access_token_expire_minutes, 15);
        assert_eq!(config.auth.refresh_token_expire_days, 15);
        assert_eq!(config.server.cors_origins, vec!["http://localhost:3000"]);
        assert!(config.is_development());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_refresh_max_age() {
        let auth = AuthConfig {
            refresh_token_expire_days: 2,
            ..Default::default()
        };
        assert_eq!(auth.refresh_max_age_secs(), 172_800);
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" http://a.test , ,http://b.test,"),
            vec!["http://a.test", "http://b.test"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            environment = "production"

            [auth]
            secret_key = "from-file"
            access_token_expire_minutes = 5
            "#,
        )
        .unwrap();

        assert!(!config.is_development());
        assert_eq!(config.auth.secret_key, "from-file");
        assert_eq!(config.auth.access_token_expire_minutes, 5);
        assert_eq!(config.auth.refresh_token_expire_days, 15);
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_validate_rejects_empty_secret() {
        let mut config = AppConfig::default();
        config.auth.secret_key.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_validate_bounds_token_lifetimes() {
        let mut config = AppConfig::default();
        config.auth.access_token_expire_minutes = MAX_ACCESS_TOKEN_EXPIRE_MINUTES;
        config.auth.refresh_token_expire_days = MAX_REFRESH_TOKEN_EXPIRE_DAYS;
        assert!(config.validate().is_ok());

        config.auth.refresh_token_expire_days = i64::MAX;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "REFRESH_TOKEN_EXPIRE_DAYS"
        ));
        assert_eq!(config.auth.refresh_max_age_secs(), i64::MAX);

        config.auth.refresh_token_expire_days = 15;
        config.auth.access_token_expire_minutes = MAX_ACCESS_TOKEN_EXPIRE_MINUTES + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "ACCESS_TOKEN_EXPIRE_MINUTES"
        ));
    }
}
