//! User repository over SQLite
//!
//! All statements are plain runtime-checked `sqlx` queries; rows come back as
//! `UserRow` and are converted to the typed `User` here. Only the gate's
//! `PrincipalRow` and the `/auth/me/` projection carry the raw role code.

use super::models::{PrincipalRow, User, UserInfo, UserRow};
use chrono::{DateTime, Utc};
use recicla_core::{role_label, Perfil};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;

/// Repository errors
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored record is invalid: {0}")]
    CorruptRecord(String),
}

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, hashed_password, \
     is_active, is_superuser, date_joined, last_login, perfil, \
     universidade_id, unidade_id, turma_id";

/// Fields of a new account, password already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub hashed_password: String,
    pub perfil: Perfil,
    pub is_superuser: bool,
    pub universidade_id: Option<i64>,
    pub unidade_id: Option<i64>,
    pub turma_id: Option<i64>,
}

/// Column changes for a partial update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub hashed_password: Option<String>,
    pub perfil: Option<Perfil>,
    pub is_active: Option<bool>,
    pub universidade_id: Option<i64>,
    pub unidade_id: Option<i64>,
    pub turma_id: Option<i64>,
}

#[derive(Debug, FromRow)]
struct UserInfoRow {
    id: i64,
    username: String,
    email: String,
    perfil: String,
    universidade: Option<String>,
    unidade: Option<String>,
    turma: Option<String>,
}

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn convert(row: UserRow) -> Result<User, RepositoryError> {
        let id = row.id;
        User::try_from(row).map_err(|e| RepositoryError::CorruptRecord(format!("users:{id}: {e}")))
    }

    fn convert_opt(row: Option<UserRow>) -> Result<Option<User>, RepositoryError> {
        row.map(Self::convert).transpose()
    }

    /// List every account ordered by id
    pub async fn get_all(&self) -> Result<Vec<User>, RepositoryError> {
        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Self::convert).collect()
    }

    /// Find user by id
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Self::convert_opt(row)
    }

    /// Load the caller of an authenticated request
    ///
    /// Unlike `get_by_id` this never fails on an unexpected role code; the
    /// gate decides what such a caller may reach.
    pub(crate) async fn get_principal(
        &self,
        id: i64,
    ) -> Result<Option<PrincipalRow>, RepositoryError> {
        let row = sqlx::query_as(
            "SELECT id, username, email, is_active, perfil, \
             universidade_id, unidade_id, turma_id FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Find user by exact username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"))
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        Self::convert_opt(row)
    }

    /// Find the first user with this email
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ? ORDER BY id LIMIT 1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Self::convert_opt(row)
    }

    /// Insert a new account; it starts active with `date_joined = now`
    pub async fn create(&self, new_user: NewUser) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO users (username, email, first_name, last_name, hashed_password, \
             is_active, is_superuser, date_joined, perfil, universidade_id, unidade_id, turma_id) \
             VALUES (?, ?, ?, ?, ?, 1, ?, ?, ?, ?, ?, ?) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.hashed_password)
        .bind(new_user.is_superuser)
        .bind(Utc::now())
        .bind(new_user.perfil.as_str())
        .bind(new_user.universidade_id)
        .bind(new_user.unidade_id)
        .bind(new_user.turma_id)
        .fetch_one(&self.pool)
        .await?;

        Self::convert(row)
    }

    /// Apply a partial update; `Ok(None)` when the user does not exist
    pub async fn update(
        &self,
        id: i64,
        changes: UserChanges,
    ) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "UPDATE users SET \
             username = COALESCE(?, username), \
             email = COALESCE(?, email), \
             first_name = COALESCE(?, first_name), \
             last_name = COALESCE(?, last_name), \
             hashed_password = COALESCE(?, hashed_password), \
             perfil = COALESCE(?, perfil), \
             is_active = COALESCE(?, is_active), \
             universidade_id = COALESCE(?, universidade_id), \
             unidade_id = COALESCE(?, unidade_id), \
             turma_id = COALESCE(?, turma_id) \
             WHERE id = ? \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(changes.username)
        .bind(changes.email)
        .bind(changes.first_name)
        .bind(changes.last_name)
        .bind(changes.hashed_password)
        .bind(changes.perfil.map(|p| p.as_str()))
        .bind(changes.is_active)
        .bind(changes.universidade_id)
        .bind(changes.unidade_id)
        .bind(changes.turma_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Self::convert_opt(row)
    }

    /// Delete an account; returns whether a row was removed
    pub async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Record a successful login
    pub async fn touch_last_login(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// User-info projection with institution names resolved
    ///
    /// The role is read as a raw code so an unexpected value still produces a
    /// projection, labelled `desconhecido`.
    pub async fn user_info(&self, id: i64) -> Result<Option<UserInfo>, RepositoryError> {
        let row: Option<UserInfoRow> = sqlx::query_as(
            "SELECT u.id, u.username, u.email, u.perfil, \
             un.nome AS universidade, ud.nome AS unidade, t.nome AS turma \
             FROM users u \
             LEFT JOIN universidades un ON un.id = u.universidade_id \
             LEFT JOIN unidades ud ON ud.id = u.unidade_id \
             LEFT JOIN turmas t ON t.id = u.turma_id \
             WHERE u.id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| UserInfo {
            id: r.id,
            username: r.username,
            email: r.email,
            role: role_label(&r.perfil).to_string(),
            universidade: r.universidade,
            unidade: r.unidade,
            turma: r.turma,
        }))
    }
}
