/// Authorization gate for protected routes
///
/// `auth_middleware` resolves the bearer token to a stored, active user and
/// attaches it to the request; `require_role` then compares the user's role
/// by exact equality. Every token problem leaves this module as the same 401
/// body, the concrete reason is only written to the audit log.
use super::jwt::{verify_token, TokenKind};
use super::models::PrincipalRow;
use super::repository::UserRepository;
use crate::audit::{audit_log, extract_ip_address, extract_user_agent, AuditEvent};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use recicla_core::Perfil;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub const CREDENTIALS_ERROR: &str = "Could not validate credentials";

/// The caller resolved by the gate
///
/// Added to request extensions by `auth_middleware`; handlers take it with
/// `Extension<AuthenticatedUser>`. `perfil` is `None` when the stored role
/// code is not one of the known roles; such a caller passes no role check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub perfil: Option<Perfil>,
    pub universidade_id: Option<i64>,
    pub unidade_id: Option<i64>,
    pub turma_id: Option<i64>,
}

impl AuthenticatedUser {
    /// Exact role check, there is no hierarchy between roles
    pub fn has_role(&self, perfil: Perfil) -> bool {
        self.perfil == Some(perfil)
    }
}

impl From<PrincipalRow> for AuthenticatedUser {
    fn from(row: PrincipalRow) -> Self {
        let perfil = Perfil::from_code(&row.perfil);
        if perfil.is_none() {
            tracing::warn!(user_id = row.id, perfil = %row.perfil, "Stored role code is not recognised");
        }

        Self {
            perfil,
            id: row.id,
            username: row.username,
            email: row.email,
            universidade_id: row.universidade_id,
            unidade_id: row.unidade_id,
            turma_id: row.turma_id,
        }
    }
}

/// Gate failures
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing or malformed Authorization header")]
    MissingCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("User {0} not found")]
    UserNotFound(i64),

    #[error("Inactive user")]
    InactiveUser,

    #[error("Not enough permissions")]
    InsufficientPermissions,

    #[error("User lookup failed: {0}")]
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials
            | AuthError::InvalidToken(_)
            | AuthError::UserNotFound(_) => {
                let mut response = (
                    StatusCode::UNAUTHORIZED,
                    Json(ApiError::new("UNAUTHORIZED", CREDENTIALS_ERROR)),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            AuthError::InactiveUser => (
                StatusCode::BAD_REQUEST,
                Json(ApiError::new("BAD_REQUEST", "Inactive user")),
            )
                .into_response(),
            AuthError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                Json(ApiError::new("FORBIDDEN", "Not enough permissions")),
            )
                .into_response(),
            AuthError::Internal(msg) => {
                tracing::error!(error = %msg, "Authentication lookup failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiError::internal_error()),
                )
                    .into_response()
            }
        }
    }
}

fn bearer_token(request: &Request<Body>) -> Option<&str> {
    let value = request.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Authentication middleware that requires a valid access token
///
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Verifies signature, expiry and that it is an access token
/// 3. Loads the user named by the `user_id` claim
/// 4. Rejects deactivated accounts
/// 5. Adds `AuthenticatedUser` to request extensions
///
/// # Usage
///
/// ```ignore
/// let protected = Router::new()
///     .route("/me/", get(me))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));
/// ```
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let ip_address = extract_ip_address(request.headers());
    let user_agent = extract_user_agent(request.headers());

    let reject = |error: AuthError| {
        audit_log(&AuditEvent::InvalidToken {
            ip_address: ip_address.clone(),
            user_agent: user_agent.clone(),
            reason: error.to_string(),
        });
        error
    };

    let token = bearer_token(&request).ok_or_else(|| reject(AuthError::MissingCredentials))?;

    let claims = verify_token(&state.jwt, token, TokenKind::Access)
        .map_err(|e| reject(AuthError::InvalidToken(e.to_string())))?;

    let user = UserRepository::new(state.db.clone())
        .get_principal(claims.user_id)
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?
        .ok_or_else(|| reject(AuthError::UserNotFound(claims.user_id)))?;

    if !user.is_active {
        audit_log(&AuditEvent::InactiveUser {
            user_id: user.id,
            username: user.username,
            ip_address,
        });
        return Err(AuthError::InactiveUser);
    }

    request.extensions_mut().insert(AuthenticatedUser::from(user));

    Ok(next.run(request).await)
}

/// Type alias for role middleware future
type RoleMiddlewareFuture =
    std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>>;

/// Middleware factory for role-based access control
///
/// Must run inside `auth_middleware`. The role is compared by equality only:
/// an `ADMIN_UNI` caller is refused on a `CHEFE` route like anyone else.
///
/// # Example
///
/// ```ignore
/// let chefe_only = Router::new()
///     .route("/pedido-doacao/", get(list_pedidos))
///     .route_layer(middleware::from_fn(require_role(Perfil::Chefe)));
/// ```
pub fn require_role(
    required: Perfil,
) -> impl Fn(Request<Body>, Next) -> RoleMiddlewareFuture + Clone {
    move |request: Request<Body>, next: Next| {
        Box::pin(async move {
            let user = request
                .extensions()
                .get::<AuthenticatedUser>()
                .ok_or(AuthError::MissingCredentials)?
                .clone();

            if !user.has_role(required) {
                audit_log(&AuditEvent::AccessDenied {
                    user_id: user.id,
                    username: user.username,
                    resource: request.uri().path().to_string(),
                    required_role: required.to_string(),
                    ip_address: extract_ip_address(request.headers()),
                    user_agent: extract_user_agent(request.headers()),
                });

                return Err(AuthError::InsufficientPermissions);
            }

            Ok(next.run(request).await)
        })
    }
}
