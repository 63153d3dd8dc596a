//! Security audit logging for authentication events
//!
//! Every login, refresh, logout, account creation and gate rejection is logged
//! at INFO level with the "audit" target, so they can be filtered and routed
//! apart from application logs (`RUST_LOG=audit=info`).
//!
//! The gate answers every token problem with the same 401 body; the concrete
//! reason only appears here.
//!
//! # Example
//!
//! ```ignore
//! use recicla_api::audit::{audit_log, AuditEvent};
//!
//! audit_log(&AuditEvent::LoginSuccess {
//!     user_id: user.id,
//!     username: user.username.clone(),
//!     ip_address: Some("192.168.1.1".to_string()),
//!     user_agent: None,
//! });
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Security audit events for authentication and authorization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// Successful user login
    LoginSuccess {
        user_id: i64,
        username: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Failed login attempt
    LoginFailure {
        username: String,
        reason: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Token pair rotated from a refresh token
    TokenRefresh {
        user_id: i64,
        username: String,
        ip_address: Option<String>,
    },

    /// Refresh token rejected
    RefreshFailure {
        reason: String,
        ip_address: Option<String>,
    },

    /// Refresh cookie cleared
    Logout { ip_address: Option<String> },

    /// Account created through a signup route
    UserCreated {
        user_id: i64,
        username: String,
        perfil: String,
        created_by: i64,
        ip_address: Option<String>,
    },

    /// Signup refused (duplicate username or email, invalid payload)
    SignupRejected {
        username: String,
        reason: String,
        created_by: i64,
    },

    /// Access denied because the role does not match
    AccessDenied {
        user_id: i64,
        username: String,
        resource: String,
        required_role: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Bearer token missing, invalid, expired, of the wrong kind, or naming
    /// a user that no longer exists
    InvalidToken {
        ip_address: Option<String>,
        user_agent: Option<String>,
        reason: String,
    },

    /// Valid token for a deactivated account
    InactiveUser {
        user_id: i64,
        username: String,
        ip_address: Option<String>,
    },
}

/// Log a security audit event with structured fields
///
/// The full event is also attached as a JSON string for log aggregators.
pub fn audit_log(event: &AuditEvent) {
    let timestamp = Utc::now();

    let event_json = serde_json::to_string(event)
        .unwrap_or_else(|e| format!("{{\"error\":\"Failed to serialize audit event: {e}\"}}"));

    match event {
        AuditEvent::LoginSuccess {
            user_id,
            username,
            ip_address,
            ..
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                username = %username,
                ip_address = ?ip_address,
                "Login successful"
            );
        }
        AuditEvent::LoginFailure {
            username,
            reason,
            ip_address,
            ..
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                username = %username,
                reason = %reason,
                ip_address = ?ip_address,
                "Login failed"
            );
        }
        AuditEvent::TokenRefresh {
            user_id,
            username,
            ip_address,
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                username = %username,
                ip_address = ?ip_address,
                "Token refresh"
            );
        }
        AuditEvent::RefreshFailure { reason, ip_address } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                reason = %reason,
                ip_address = ?ip_address,
                "Token refresh rejected"
            );
        }
        AuditEvent::Logout { ip_address } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                ip_address = ?ip_address,
                "User logout"
            );
        }
        AuditEvent::UserCreated {
            user_id,
            username,
            perfil,
            created_by,
            ip_address,
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                username = %username,
                perfil = %perfil,
                created_by = %created_by,
                ip_address = ?ip_address,
                "User created"
            );
        }
        AuditEvent::SignupRejected {
            username,
            reason,
            created_by,
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                username = %username,
                reason = %reason,
                created_by = %created_by,
                "Signup rejected"
            );
        }
        AuditEvent::AccessDenied {
            user_id,
            username,
            resource,
            required_role,
            ip_address,
            ..
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                username = %username,
                resource = %resource,
                required_role = %required_role,
                ip_address = ?ip_address,
                "Access denied"
            );
        }
        AuditEvent::InvalidToken {
            ip_address, reason, ..
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                ip_address = ?ip_address,
                reason = %reason,
                "Invalid token"
            );
        }
        AuditEvent::InactiveUser {
            user_id,
            username,
            ip_address,
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                username = %username,
                ip_address = ?ip_address,
                "Inactive user rejected"
            );
        }
    }
}

/// Extract the client IP from proxy headers
///
/// Checks X-Forwarded-For (first hop) and then X-Real-IP.
pub fn extract_ip_address(headers: &axum::http::HeaderMap) -> Option<String> {
    if let Some(xff) = headers.get("x-forwarded-for") {
        if let Ok(xff_str) = xff.to_str() {
            if let Some(first_ip) = xff_str.split(',').next() {
                return Some(first_ip.trim().to_string());
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return Some(ip_str.to_string());
        }
    }

    None
}

/// Extract the user agent from request headers
pub fn extract_user_agent(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|ua| ua.to_str().ok())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_event_serialization() {
        let event = AuditEvent::LoginSuccess {
            user_id: 7,
            username: "alice".to_string(),
            ip_address: Some("192.168.1.1".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event_type\":\"login_success\""));
        assert!(json.contains("alice"));
    }

    #[test]
    fn test_audit_log_does_not_panic() {
        audit_log(&AuditEvent::LoginFailure {
            username: "alice".to_string(),
            reason: "Invalid password".to_string(),
            ip_address: None,
            user_agent: None,
        });
        audit_log(&AuditEvent::UserCreated {
            user_id: 2,
            username: "bob".to_string(),
            perfil: "ALUNO".to_string(),
            created_by: 1,
            ip_address: None,
        });
        audit_log(&AuditEvent::AccessDenied {
            user_id: 3,
            username: "carol".to_string(),
            resource: "/api/v1/recycling/pedido-doacao/".to_string(),
            required_role: "CHEFE".to_string(),
            ip_address: Some("10.0.0.1".to_string()),
            user_agent: None,
        });
        audit_log(&AuditEvent::Logout { ip_address: None });
    }

    #[test]
    fn test_extract_ip_from_x_forwarded_for() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            "203.0.113.1, 198.51.100.1".parse().unwrap(),
        );

        assert_eq!(extract_ip_address(&headers), Some("203.0.113.1".to_string()));
    }

    #[test]
    fn test_extract_ip_from_x_real_ip() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert("x-real-ip", "203.0.113.1".parse().unwrap());

        assert_eq!(extract_ip_address(&headers), Some("203.0.113.1".to_string()));
    }

    #[test]
    fn test_extract_missing_headers() {
        let headers = axum::http::HeaderMap::new();

        assert_eq!(extract_ip_address(&headers), None);
        assert_eq!(extract_user_agent(&headers), None);
    }
}
