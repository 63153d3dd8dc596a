//! Authentication API handlers
//!
//! Login, refresh rotation, logout, the identity projection and the
//! role-gated signup routes.

use super::DetailResponse;
use crate::audit::{audit_log, extract_ip_address, extract_user_agent, AuditEvent};
use crate::auth::cookie::{clear_refresh_cookie, extract_refresh_token, refresh_cookie, set_cookie_header};
use crate::auth::{
    AuthService, AuthenticatedUser, LoginForm, LoginResponse, RefreshResponse, UserCreate,
    UserPublic, UserService,
};
use crate::error::AppError;
use crate::extract::{AppForm, AppJson};
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    routing::{post, MethodRouter},
    Extension, Json,
};
use cookie::Cookie;
use recicla_core::Perfil;
use std::sync::Arc;

pub const LOGIN_FAILED: &str = "Incorrect username or password";
pub const REFRESH_TOKEN_MISSING: &str = "Refresh token not found";

fn cookie_header(cookie: &Cookie<'_>) -> Result<[(header::HeaderName, HeaderValue); 1], AppError> {
    let value = set_cookie_header(cookie)
        .ok_or_else(|| AppError::Internal("Refresh cookie is not a valid header value".to_string()))?;
    Ok([(header::SET_COOKIE, value)])
}

/// Login with username and password
///
/// On success the refresh token is set as an HttpOnly cookie and only the
/// access token is returned in the body. Unknown user and wrong password get
/// the same 401.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login/",
    tag = "auth",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ApiError),
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    AppForm(form): AppForm<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    let ip_address = extract_ip_address(&headers);
    let user_agent = extract_user_agent(&headers);

    let auth_service = AuthService::new(state.db.clone(), state.jwt.clone());
    let Some(user) = auth_service
        .authenticate_user(&form.username, &form.password)
        .await?
    else {
        audit_log(&AuditEvent::LoginFailure {
            username: form.username,
            reason: "invalid_credentials".to_string(),
            ip_address,
            user_agent,
        });
        return Err(AppError::Unauthorized(LOGIN_FAILED.to_string()));
    };

    let tokens = auth_service.create_tokens(&user)?;
    let cookie = cookie_header(&refresh_cookie(&tokens.refresh_token, &state.config.auth))?;

    audit_log(&AuditEvent::LoginSuccess {
        user_id: user.id,
        username: user.username.clone(),
        ip_address,
        user_agent,
    });

    Ok((
        cookie,
        Json(LoginResponse {
            access_token: tokens.access_token,
            token_type: tokens.token_type.to_string(),
            username: user.username,
        }),
    ))
}

/// Rotate the token pair using the refresh cookie
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh/",
    tag = "auth",
    responses(
        (status = 200, description = "New access token; refresh cookie replaced", body = RefreshResponse),
        (status = 400, description = "No refresh cookie", body = crate::error::ApiError),
        (status = 401, description = "Invalid refresh token", body = crate::error::ApiError),
    )
)]
pub async fn refresh_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let ip_address = extract_ip_address(&headers);

    let Some(refresh_token) = extract_refresh_token(&headers) else {
        return Err(AppError::BadRequest(REFRESH_TOKEN_MISSING.to_string()));
    };

    let auth_service = AuthService::new(state.db.clone(), state.jwt.clone());
    let (user, tokens) = match auth_service.refresh_access_token(&refresh_token).await {
        Ok(refreshed) => refreshed,
        Err(e) => {
            audit_log(&AuditEvent::RefreshFailure {
                reason: e.to_string(),
                ip_address,
            });
            return Err(e);
        }
    };

    let cookie = cookie_header(&refresh_cookie(&tokens.refresh_token, &state.config.auth))?;

    audit_log(&AuditEvent::TokenRefresh {
        user_id: user.id,
        username: user.username,
        ip_address,
    });

    Ok((
        cookie,
        Json(RefreshResponse {
            access_token: tokens.access_token,
            token_type: tokens.token_type.to_string(),
        }),
    ))
}

/// Clear the refresh cookie
///
/// Stateless: an access token already handed out stays valid until it
/// expires.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout/",
    tag = "auth",
    responses(
        (status = 200, description = "Refresh cookie cleared", body = DetailResponse),
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let cookie = cookie_header(&clear_refresh_cookie(&state.config.auth))?;

    audit_log(&AuditEvent::Logout {
        ip_address: extract_ip_address(&headers),
    });

    Ok((cookie, Json(DetailResponse::new("Successfully logged out"))))
}

/// Current user projection
#[utoipa::path(
    get,
    path = "/api/v1/auth/me/",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = crate::auth::UserInfo),
        (status = 400, description = "Inactive user", body = crate::error::ApiError),
        (status = 401, description = "Unauthorized", body = crate::error::ApiError),
        (status = 404, description = "User not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, AppError> {
    let auth_service = AuthService::new(state.db.clone(), state.jwt.clone());
    let info = auth_service
        .get_user_info(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(info))
}

/// Create an account of role `target`
///
/// The role comes from the route; a `perfil` field in the body is ignored.
/// The caller's own role has already been checked against the creation
/// table by the route layer.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup/{perfil}/",
    tag = "auth",
    params(("perfil" = String, Path, description = "One of coord, ponto, chefe, aluno")),
    request_body = UserCreate,
    responses(
        (status = 200, description = "Account created", body = UserPublic),
        (status = 400, description = "Invalid payload or duplicate username/email", body = crate::error::ApiError),
        (status = 403, description = "Caller may not create this role", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn signup(
    target: Perfil,
    state: Arc<AppState>,
    caller: AuthenticatedUser,
    headers: HeaderMap,
    payload: UserCreate,
) -> Result<Json<UserPublic>, AppError> {
    let username = payload.username.clone();

    let user = match UserService::new(state.db.clone())
        .create_user(payload, target)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            audit_log(&AuditEvent::SignupRejected {
                username,
                reason: e.to_string(),
                created_by: caller.id,
            });
            return Err(e);
        }
    };

    audit_log(&AuditEvent::UserCreated {
        user_id: user.id,
        username: user.username.clone(),
        perfil: user.perfil.to_string(),
        created_by: caller.id,
        ip_address: extract_ip_address(&headers),
    });

    Ok(Json(user.to_public()))
}

/// POST route creating accounts of role `target`
pub fn signup_route(target: Perfil) -> MethodRouter<Arc<AppState>> {
    post(
        move |State(state): State<Arc<AppState>>,
              Extension(caller): Extension<AuthenticatedUser>,
              headers: HeaderMap,
              AppJson(payload): AppJson<UserCreate>| async move {
            signup(target, state, caller, headers, payload).await
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use recicla_core::AuthConfig;

    #[test]
    fn test_cookie_header_is_set_cookie() {
        let config = AuthConfig::default();
        let [(name, value)] = cookie_header(&refresh_cookie("abc", &config)).unwrap();
        assert_eq!(name, header::SET_COOKIE);

        let value = value.to_str().unwrap();
        assert!(value.starts_with("refresh_token=abc"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=Lax"));
    }

    #[test]
    fn test_logout_cookie_expires_immediately() {
        let config = AuthConfig::default();
        let [(_, value)] = cookie_header(&clear_refresh_cookie(&config)).unwrap();
        assert!(value.to_str().unwrap().contains("Max-Age=0"));
    }
}
