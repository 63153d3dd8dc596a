//! Authentication service layer
//!
//! `AuthService` covers login, token issuance, refresh rotation and the
//! identity projection. `UserService` owns account creation and maintenance.
//! Both are cheap to build and are constructed per request from the pool.

use super::jwt::{create_access_token, create_refresh_token, verify_token, JwtConfig, TokenKind};
use super::models::{TokenPair, User, UserCreate, UserInfo, UserUpdate, TOKEN_TYPE_BEARER};
use super::password::{hash_password, verify_password};
use super::repository::{NewUser, RepositoryError, UserChanges, UserRepository};
use crate::error::AppError;
use chrono::Utc;
use recicla_core::Perfil;
use sqlx::SqlitePool;
use validator::Validate;

pub const INVALID_REFRESH_TOKEN: &str = "Invalid refresh token";

/// Authentication service
pub struct AuthService {
    users: UserRepository,
    jwt_config: JwtConfig,
}

impl AuthService {
    pub fn new(db_pool: SqlitePool, jwt_config: JwtConfig) -> Self {
        Self {
            users: UserRepository::new(db_pool),
            jwt_config,
        }
    }

    /// Check a username/password pair
    ///
    /// # Returns
    ///
    /// * `Ok(Some(User))` - Credentials match; `last_login` has been stamped
    /// * `Ok(None)` - Unknown username or wrong password (indistinguishable)
    /// * `Err(AppError)` - Storage failure
    pub async fn authenticate_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        let Some(mut user) = self.users.get_by_username(username).await? else {
            tracing::debug!(username, "Login for unknown username");
            return Ok(None);
        };

        if !verify_password(password, &user.hashed_password) {
            tracing::debug!(username, "Login with wrong password");
            return Ok(None);
        }

        let now = Utc::now();
        self.users.touch_last_login(user.id, now).await?;
        user.last_login = Some(now);

        Ok(Some(user))
    }

    /// Issue an access/refresh pair for `user`
    pub fn create_tokens(&self, user: &User) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: create_access_token(&self.jwt_config, &user.username, user.id)?,
            refresh_token: create_refresh_token(&self.jwt_config, &user.username, user.id)?,
            token_type: TOKEN_TYPE_BEARER,
        })
    }

    /// Exchange a refresh token for a fresh pair
    ///
    /// The embedded user id is re-resolved so a deleted account cannot
    /// refresh. Any failure is reported as `Invalid refresh token`.
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<(User, TokenPair), AppError> {
        let claims = verify_token(&self.jwt_config, refresh_token, TokenKind::Refresh)
            .map_err(|e| {
                tracing::debug!(error = %e, "Refresh token rejected");
                AppError::Unauthorized(INVALID_REFRESH_TOKEN.to_string())
            })?;

        let user = match self.users.get_by_id(claims.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::debug!(user_id = claims.user_id, "Refresh for missing user");
                return Err(AppError::Unauthorized(INVALID_REFRESH_TOKEN.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let tokens = self.create_tokens(&user)?;
        Ok((user, tokens))
    }

    /// Identity projection for `/auth/me/`
    pub async fn get_user_info(&self, user_id: i64) -> Result<Option<UserInfo>, AppError> {
        Ok(self.users.user_info(user_id).await?)
    }
}

/// User account service
pub struct UserService {
    repository: UserRepository,
}

impl UserService {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self {
            repository: UserRepository::new(db_pool),
        }
    }

    /// Create an account with the given role
    ///
    /// # Returns
    ///
    /// * `Ok(User)` - The stored account, active, with `date_joined = now`
    /// * `Err(AppError::BadRequest)` - Invalid payload, or the username or
    ///   email is already registered
    pub async fn create_user(&self, payload: UserCreate, perfil: Perfil) -> Result<User, AppError> {
        payload.validate()?;

        if self
            .repository
            .get_by_username(&payload.username)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest("Username already registered".to_string()));
        }

        if self.repository.get_by_email(&payload.email).await?.is_some() {
            return Err(AppError::BadRequest("Email already registered".to_string()));
        }

        let hashed_password = hash_password(&payload.password)?;

        let created = self
            .repository
            .create(NewUser {
                username: payload.username,
                email: payload.email,
                first_name: payload.first_name,
                last_name: payload.last_name,
                hashed_password,
                perfil,
                is_superuser: false,
                universidade_id: payload.universidade_id,
                unidade_id: payload.unidade_id,
                turma_id: payload.turma_id,
            })
            .await;

        match created {
            Ok(user) => Ok(user),
            // Lost a race with a concurrent signup for the same name.
            Err(RepositoryError::Database(sqlx::Error::Database(db_err)))
                if db_err.is_unique_violation() =>
            {
                Err(AppError::BadRequest("Username already registered".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_user_by_id(&self, user_id: i64) -> Result<Option<User>, AppError> {
        Ok(self.repository.get_by_id(user_id).await?)
    }

    pub async fn get_all_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.repository.get_all().await?)
    }

    /// Partial update; `Ok(None)` when the user does not exist
    pub async fn update_user(
        &self,
        user_id: i64,
        update: UserUpdate,
    ) -> Result<Option<User>, AppError> {
        update.validate()?;

        let hashed_password = update.password.as_deref().map(hash_password).transpose()?;

        let changes = UserChanges {
            username: update.username,
            email: update.email,
            first_name: update.first_name,
            last_name: update.last_name,
            hashed_password,
            perfil: update.perfil,
            is_active: update.is_active,
            universidade_id: update.universidade_id,
            unidade_id: update.unidade_id,
            turma_id: update.turma_id,
        };

        Ok(self.repository.update(user_id, changes).await?)
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<bool, AppError> {
        Ok(self.repository.delete(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use axum::http::StatusCode;

    async fn pool() -> SqlitePool {
        let pool = db::connect_in_memory().await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        pool
    }

    fn payload(username: &str) -> UserCreate {
        UserCreate {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "secret1".to_string(),
            first_name: None,
            last_name: None,
            universidade_id: None,
            unidade_id: None,
            turma_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_user_sets_role_and_defaults() {
        let users = UserService::new(pool().await);
        let user = users.create_user(payload("alice"), Perfil::Aluno).await.unwrap();

        assert_eq!(user.perfil, Perfil::Aluno);
        assert!(user.is_active);
        assert!(!user.is_superuser);
        assert_ne!(user.hashed_password, "secret1");
    }

    #[tokio::test]
    async fn test_duplicate_username_and_email() {
        let users = UserService::new(pool().await);
        users.create_user(payload("alice"), Perfil::Aluno).await.unwrap();

        let err = users
            .create_user(payload("alice"), Perfil::Chefe)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Username already registered");

        let err = users
            .create_user(
                UserCreate {
                    username: "alice2".to_string(),
                    ..payload("alice")
                },
                Perfil::Aluno,
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Email already registered");
    }

    #[tokio::test]
    async fn test_invalid_payload_is_bad_request() {
        let users = UserService::new(pool().await);
        let err = users
            .create_user(
                UserCreate {
                    password: "123".to_string(),
                    ..payload("bob")
                },
                Perfil::Aluno,
            )
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_authenticate_user() {
        let pool = pool().await;
        UserService::new(pool.clone())
            .create_user(payload("carol"), Perfil::Coord)
            .await
            .unwrap();
        let auth = AuthService::new(pool, JwtConfig::default());

        let user = auth.authenticate_user("carol", "secret1").await.unwrap().unwrap();
        assert_eq!(user.username, "carol");
        assert!(user.last_login.is_some());

        assert!(auth.authenticate_user("carol", "wrong").await.unwrap().is_none());
        assert!(auth.authenticate_user("nobody", "secret1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tokens_share_user_id_and_differ_in_kind() {
        let pool = pool().await;
        let user = UserService::new(pool.clone())
            .create_user(payload("dave"), Perfil::Chefe)
            .await
            .unwrap();
        let jwt = JwtConfig::default();
        let auth = AuthService::new(pool, jwt.clone());

        let pair = auth.create_tokens(&user).unwrap();
        assert_eq!(pair.token_type, "bearer");

        let access = verify_token(&jwt, &pair.access_token, TokenKind::Access).unwrap();
        let refresh = verify_token(&jwt, &pair.refresh_token, TokenKind::Refresh).unwrap();
        assert_eq!(access.user_id, user.id);
        assert_eq!(refresh.user_id, user.id);
        assert_eq!(access.sub, "dave");
    }

    #[tokio::test]
    async fn test_refresh_rotates_pair() {
        let pool = pool().await;
        let user = UserService::new(pool.clone())
            .create_user(payload("erin"), Perfil::Ponto)
            .await
            .unwrap();
        let auth = AuthService::new(pool, JwtConfig::default());

        let pair = auth.create_tokens(&user).unwrap();
        let (refreshed_user, rotated) = auth.refresh_access_token(&pair.refresh_token).await.unwrap();

        assert_eq!(refreshed_user.id, user.id);
        assert_ne!(rotated.refresh_token, pair.refresh_token);
        assert_ne!(rotated.access_token, pair.access_token);
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token_and_missing_user() {
        let pool = pool().await;
        let users = UserService::new(pool.clone());
        let user = users.create_user(payload("frank"), Perfil::Aluno).await.unwrap();
        let auth = AuthService::new(pool, JwtConfig::default());
        let pair = auth.create_tokens(&user).unwrap();

        let err = auth.refresh_access_token(&pair.access_token).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), INVALID_REFRESH_TOKEN);

        assert!(users.delete_user(user.id).await.unwrap());
        let err = auth.refresh_access_token(&pair.refresh_token).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), INVALID_REFRESH_TOKEN);
    }

    #[tokio::test]
    async fn test_get_user_info() {
        let pool = pool().await;
        let user = UserService::new(pool.clone())
            .create_user(payload("gina"), Perfil::Aluno)
            .await
            .unwrap();
        let auth = AuthService::new(pool, JwtConfig::default());

        let info = auth.get_user_info(user.id).await.unwrap().unwrap();
        assert_eq!(info.role, "aluno");
        assert_eq!(info.email, "gina@example.com");
        assert!(auth.get_user_info(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_user() {
        let users = UserService::new(pool().await);
        let user = users.create_user(payload("hank"), Perfil::Aluno).await.unwrap();

        let updated = users
            .update_user(
                user.id,
                UserUpdate {
                    perfil: Some(Perfil::Chefe),
                    password: Some("another1".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.perfil, Perfil::Chefe);
        assert_eq!(updated.email, "hank@example.com");
        assert!(verify_password("another1", &updated.hashed_password));

        assert!(users
            .update_user(999, UserUpdate::default())
            .await
            .unwrap()
            .is_none());
        assert_eq!(users.get_all_users().await.unwrap().len(), 1);
    }
}
