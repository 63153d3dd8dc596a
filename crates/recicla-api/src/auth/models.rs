//! Account models and auth request/response bodies
//!
//! - `User`: a stored account with its typed role
//! - `UserPublic`: the projection returned by signup (no password hash)
//! - `UserInfo`: the `/auth/me/` projection with resolved institution names
//! - Login / refresh payloads

use chrono::{DateTime, Utc};
use recicla_core::Perfil;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// User account
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Argon2id PHC string
    pub hashed_password: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub perfil: Perfil,
    pub universidade_id: Option<i64>,
    pub unidade_id: Option<i64>,
    pub turma_id: Option<i64>,
}

impl User {
    /// Convert user to public representation (without the password hash)
    pub fn to_public(&self) -> UserPublic {
        UserPublic {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            perfil: self.perfil,
            universidade_id: self.universidade_id,
            unidade_id: self.unidade_id,
            turma_id: self.turma_id,
            is_active: self.is_active,
            is_superuser: self.is_superuser,
            date_joined: self.date_joined,
            last_login: self.last_login,
        }
    }
}

/// Raw `users` row; the role is still the stored code
#[derive(Debug, Clone, FromRow)]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub hashed_password: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub perfil: String,
    pub universidade_id: Option<i64>,
    pub unidade_id: Option<i64>,
    pub turma_id: Option<i64>,
}

impl TryFrom<UserRow> for User {
    type Error = recicla_core::UnknownPerfil;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            perfil: row.perfil.parse()?,
            id: row.id,
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            hashed_password: row.hashed_password,
            is_active: row.is_active,
            is_superuser: row.is_superuser,
            date_joined: row.date_joined,
            last_login: row.last_login,
            universidade_id: row.universidade_id,
            unidade_id: row.unidade_id,
            turma_id: row.turma_id,
        })
    }
}

/// The columns the authorization gate reads, role still the stored code
#[derive(Debug, Clone, FromRow)]
pub(crate) struct PrincipalRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub perfil: String,
    pub universidade_id: Option<i64>,
    pub unidade_id: Option<i64>,
    pub turma_id: Option<i64>,
}

/// Public user representation (safe for API responses)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserPublic {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[schema(value_type = String, example = "ALUNO")]
    pub perfil: Perfil,
    pub universidade_id: Option<i64>,
    pub unidade_id: Option<i64>,
    pub turma_id: Option<i64>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// New-user payload for the signup routes
///
/// The role is fixed by the route, so a `perfil` field in the body is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UserCreate {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(email, length(max = 254))]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    pub universidade_id: Option<i64>,
    pub unidade_id: Option<i64>,
    pub turma_id: Option<i64>,
}

/// Partial user update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UserUpdate {
    #[validate(length(min = 1, max = 150))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub perfil: Option<Perfil>,
    pub universidade_id: Option<i64>,
    pub unidade_id: Option<i64>,
    pub turma_id: Option<i64>,
    pub is_active: Option<bool>,
    /// New plaintext password, hashed before storage
    #[validate(length(min = 6))]
    pub password: Option<String>,
}

/// `/auth/me/` projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Display label of the role, e.g. `aluno`
    pub role: String,
    pub universidade: Option<String>,
    pub unidade: Option<String>,
    pub turma: Option<String>,
}

/// Login form (`application/x-www-form-urlencoded`)
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Login response body; the refresh token travels in the cookie
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub username: String,
}

/// Refresh response body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Access and refresh token issued together
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

pub const TOKEN_TYPE_BEARER: &str = "bearer";

#[cfg(test)]
mod tests {
    use super::*;

    fn row(perfil: &str) -> UserRow {
        UserRow {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            first_name: Some("Alice".to_string()),
            last_name: None,
            hashed_password: "$argon2id$secret".to_string(),
            is_active: true,
            is_superuser: false,
            date_joined: Utc::now(),
            last_login: None,
            perfil: perfil.to_string(),
            universidade_id: Some(1),
            unidade_id: None,
            turma_id: None,
        }
    }

    #[test]
    fn test_row_to_user() {
        let user = User::try_from(row("CHEFE")).unwrap();
        assert_eq!(user.perfil, Perfil::Chefe);
        assert_eq!(user.universidade_id, Some(1));
    }

    #[test]
    fn test_row_with_unknown_role_is_rejected() {
        assert!(User::try_from(row("GUEST")).is_err());
    }

    #[test]
    fn test_user_to_public_hides_hash() {
        let user = User::try_from(row("ALUNO")).unwrap();
        let json = serde_json::to_value(user.to_public()).unwrap();

        assert_eq!(json["perfil"], "ALUNO");
        assert_eq!(json["is_active"], true);
        assert!(json.get("hashed_password").is_none());
        assert!(!json.to_string().contains("argon2"));
    }

    #[test]
    fn test_user_create_validation() {
        let valid = UserCreate {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret1".to_string(),
            first_name: None,
            last_name: None,
            universidade_id: None,
            unidade_id: None,
            turma_id: None,
        };
        assert!(valid.validate().is_ok());

        let short_password = UserCreate {
            password: "12345".to_string(),
            ..valid.clone()
        };
        assert!(short_password.validate().is_err());

        let bad_email = UserCreate {
            email: "not-an-email".to_string(),
            ..valid.clone()
        };
        assert!(bad_email.validate().is_err());

        let empty_username = UserCreate {
            username: String::new(),
            ..valid.clone()
        };
        assert!(empty_username.validate().is_err());

        let long_username = UserCreate {
            username: "a".repeat(151),
            ..valid
        };
        assert!(long_username.validate().is_err());
    }

    #[test]
    fn test_user_create_ignores_perfil_field() {
        let body = serde_json::json!({
            "username": "bob",
            "email": "bob@example.com",
            "password": "secret1",
            "perfil": "ADMIN_UNI"
        });
        let payload: UserCreate = serde_json::from_value(body).unwrap();
        assert_eq!(payload.username, "bob");
    }

    #[test]
    fn test_user_update_is_partial() {
        let update: UserUpdate = serde_json::from_str(r#"{"is_active": false}"#).unwrap();
        assert_eq!(update.is_active, Some(false));
        assert!(update.username.is_none());
        assert!(update.validate().is_ok());
    }
}
