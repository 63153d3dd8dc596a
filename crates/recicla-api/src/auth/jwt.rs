//! JWT token generation and validation
//!
//! Implements the access/refresh token pair with HMAC signing. Both kinds carry
//! the same claims and differ only in lifetime and in the `type` claim, which
//! keeps one kind from being replayed as the other.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use recicla_core::AuthConfig;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

/// Token kind, carried in the `type` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - username
    pub sub: String,
    /// Numeric user identifier
    pub user_id: i64,
    /// Token kind
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// JWT ID - unique per issued token
    pub jti: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
    /// Expiration timestamp (Unix epoch)
    pub exp: u64,
}

/// JWT token generation and validation errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode JWT: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid token format")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Expected a {expected} token")]
    WrongKind { expected: &'static str },

    #[error("Unsupported JWT algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("System time error: {0}")]
    SystemTimeError(#[from] std::time::SystemTimeError),
}

/// JWT Configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for HMAC signing
    pub secret: String,
    /// Signing algorithm (HMAC family only)
    pub algorithm: Algorithm,
    /// Access token lifetime in seconds
    pub access_expiration_secs: u64,
    /// Refresh token lifetime in seconds
    pub refresh_expiration_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "development-secret-key-change-in-production".to_string(),
            algorithm: Algorithm::HS256,
            access_expiration_secs: 15 * 60,
            refresh_expiration_secs: 15 * 24 * 60 * 60,
        }
    }
}

impl JwtConfig {
    /// Build the token configuration from the application auth settings
    pub fn from_auth_config(config: &AuthConfig) -> Result<Self, JwtError> {
        let algorithm = Algorithm::from_str(&config.algorithm)
            .map_err(|_| JwtError::UnsupportedAlgorithm(config.algorithm.clone()))?;

        // Only a shared secret is configured, so asymmetric algorithms cannot work.
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(JwtError::UnsupportedAlgorithm(config.algorithm.clone()));
        }

        Ok(Self {
            secret: config.secret_key.clone(),
            algorithm,
            access_expiration_secs: (config.access_token_expire_minutes.max(0) as u64).saturating_mul(60),
            refresh_expiration_secs: (config.refresh_token_expire_days.max(0) as u64)
                .saturating_mul(24 * 60 * 60),
        })
    }

    fn lifetime(&self, kind: TokenKind) -> u64 {
        match kind {
            TokenKind::Access => self.access_expiration_secs,
            TokenKind::Refresh => self.refresh_expiration_secs,
        }
    }
}

/// Create a short-lived access token for `username` / `user_id`
pub fn create_access_token(
    config: &JwtConfig,
    username: &str,
    user_id: i64,
) -> Result<String, JwtError> {
    create_token(config, TokenKind::Access, username, user_id)
}

/// Create a long-lived refresh token for `username` / `user_id`
pub fn create_refresh_token(
    config: &JwtConfig,
    username: &str,
    user_id: i64,
) -> Result<String, JwtError> {
    create_token(config, TokenKind::Refresh, username, user_id)
}

fn create_token(
    config: &JwtConfig,
    kind: TokenKind,
    username: &str,
    user_id: i64,
) -> Result<String, JwtError> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

    let claims = Claims {
        sub: username.to_string(),
        user_id,
        kind,
        jti: Uuid::new_v4().to_string(),
        iat: now,
        exp: now.saturating_add(config.lifetime(kind)),
    };

    let token = encode(
        &Header::new(config.algorithm),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;

    Ok(token)
}

/// Validate a token and check that it is of the expected kind
///
/// Fails on a bad signature, an expired `exp`, a malformed token, missing
/// claims, or a `type` claim other than `expected`.
pub fn verify_token(config: &JwtConfig, token: &str, expected: TokenKind) -> Result<Claims, JwtError> {
    let validation = Validation::new(config.algorithm);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidSignature,
        _ => JwtError::InvalidToken,
    })?;

    if token_data.claims.kind != expected {
        return Err(JwtError::WrongKind {
            expected: expected.as_str(),
        });
    }

    Ok(token_data.claims)
}
