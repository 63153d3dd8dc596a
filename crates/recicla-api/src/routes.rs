//! API route definitions
//!
//! Every protected router is wrapped in the authorization gate last, so it
//! runs before any role check merged into it.

use crate::auth::middleware::{auth_middleware, require_role};
use crate::handlers::{self, auth, health, institutional, recycling};
use crate::middleware::security_headers_middleware;
use crate::state::AppState;
use axum::{
    http::HeaderValue,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use recicla_core::{Perfil, CREATION_POLICY};
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    info(title = "Ser Recicla API", description = "University recycling program backend"),
    paths(
        health::root,
        health::health_check,
        auth::login_handler,
        auth::refresh_handler,
        auth::logout_handler,
        auth::me_handler,
        auth::signup,
        institutional::list_universidades,
        institutional::create_universidade,
        institutional::get_universidade,
        institutional::update_universidade,
        institutional::delete_universidade,
        institutional::list_unidades,
        institutional::create_unidade,
        institutional::get_unidade,
        institutional::update_unidade,
        institutional::delete_unidade,
        institutional::list_cursos,
        institutional::create_curso,
        institutional::get_curso,
        institutional::update_curso,
        institutional::delete_curso,
        institutional::list_turmas,
        institutional::create_turma,
        institutional::get_turma,
        institutional::update_turma,
        institutional::delete_turma,
        recycling::list_tipos_residuo,
        recycling::create_tipo_residuo,
        recycling::list_pontos_coleta,
        recycling::create_ponto_coleta,
        recycling::get_ponto_coleta,
        recycling::update_ponto_coleta,
        recycling::delete_ponto_coleta,
        recycling::list_pedidos_doacao,
        recycling::create_pedido_doacao,
        recycling::get_pedido_doacao,
        recycling::update_pedido_doacao,
        recycling::delete_pedido_doacao,
        recycling::list_lancamentos_residuo,
        recycling::create_lancamento_residuo,
        recycling::get_lancamento_residuo,
        recycling::update_lancamento_residuo,
        recycling::delete_lancamento_residuo,
    ),
    components(schemas(
        crate::error::ApiError,
        handlers::DetailResponse,
        health::RootResponse,
        health::HealthResponse,
        crate::auth::LoginForm,
        crate::auth::LoginResponse,
        crate::auth::RefreshResponse,
        crate::auth::UserCreate,
        crate::auth::UserPublic,
        crate::auth::UserInfo,
        crate::institutional::Universidade,
        crate::institutional::UniversidadeCreate,
        crate::institutional::UniversidadeUpdate,
        crate::institutional::Unidade,
        crate::institutional::UnidadeCreate,
        crate::institutional::UnidadeUpdate,
        crate::institutional::Curso,
        crate::institutional::CursoCreate,
        crate::institutional::CursoUpdate,
        crate::institutional::Turma,
        crate::institutional::TurmaCreate,
        crate::institutional::TurmaUpdate,
        crate::recycling::TipoResiduo,
        crate::recycling::TipoResiduoCreate,
        crate::recycling::PontoColeta,
        crate::recycling::PontoColetaCreate,
        crate::recycling::PontoColetaUpdate,
        crate::recycling::PedidoDoacao,
        crate::recycling::PedidoDoacaoCreate,
        crate::recycling::PedidoDoacaoUpdate,
        crate::recycling::LancamentoResiduo,
        crate::recycling::LancamentoResiduoCreate,
        crate::recycling::LancamentoResiduoUpdate,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Login, token refresh and account creation"),
        (name = "institutional", description = "Universities, units, courses and classes"),
        (name = "recycling", description = "Collection points, donation requests and drop-offs"),
        (name = "health", description = "Service status"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// `/auth` routes
///
/// Signup routes are generated from the creation table: one route per target
/// role, each gated on the single creator role.
fn auth_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let public_routes = Router::new()
        .route("/login/", post(auth::login_handler))
        .route("/refresh/", post(auth::refresh_handler))
        .route("/logout/", post(auth::logout_handler));

    let mut protected_routes = Router::new().route("/me/", get(auth::me_handler));
    for rule in CREATION_POLICY {
        let signup = Router::new()
            .route(
                &format!("/signup/{}/", rule.slug),
                auth::signup_route(rule.target),
            )
            .route_layer(middleware::from_fn(require_role(rule.creator)));
        protected_routes = protected_routes.merge(signup);
    }

    public_routes.merge(
        protected_routes.route_layer(middleware::from_fn_with_state(state, auth_middleware)),
    )
}

/// `/institutional` routes
fn institutional_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use institutional::*;

    let open_routes = Router::new()
        .route("/university/", get(list_universidades))
        .route("/university/:id/", get(get_universidade))
        .route("/unit/", get(list_unidades).post(create_unidade))
        .route("/unit/:id/", get(get_unidade))
        .route("/course/", get(list_cursos).post(create_curso))
        .route("/course/:id/", get(get_curso))
        .route("/class/", get(list_turmas).post(create_turma))
        .route("/class/:id/", get(get_turma));

    let admin_routes = Router::new()
        .route("/university/", post(create_universidade))
        .route(
            "/university/:id/",
            axum::routing::put(update_universidade).delete(delete_universidade),
        )
        .route(
            "/unit/:id/",
            axum::routing::put(update_unidade).delete(delete_unidade),
        )
        .route(
            "/course/:id/",
            axum::routing::put(update_curso).delete(delete_curso),
        )
        .route(
            "/class/:id/",
            axum::routing::put(update_turma).delete(delete_turma),
        )
        .route_layer(middleware::from_fn(require_role(Perfil::AdminUni)));

    open_routes
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// `/recycling` routes
fn recycling_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use recycling::*;

    let open_routes = Router::new().route(
        "/tipo-residuo/",
        get(list_tipos_residuo).post(create_tipo_residuo),
    );

    let ponto_coleta_routes = Router::new()
        .route(
            "/pontos-coleta/",
            get(list_pontos_coleta).post(create_ponto_coleta),
        )
        .route(
            "/ponto-coleta/:id/",
            get(get_ponto_coleta)
                .put(update_ponto_coleta)
                .delete(delete_ponto_coleta),
        )
        .route_layer(middleware::from_fn(require_role(Perfil::AdminUni)));

    let pedido_routes = Router::new()
        .route(
            "/pedido-doacao/",
            get(list_pedidos_doacao).post(create_pedido_doacao),
        )
        .route(
            "/pedido-doacao/:id/",
            get(get_pedido_doacao)
                .put(update_pedido_doacao)
                .delete(delete_pedido_doacao),
        )
        .route_layer(middleware::from_fn(require_role(Perfil::Chefe)));

    let lancamento_routes = Router::new()
        .route(
            "/lancamento-residuo/",
            get(list_lancamentos_residuo).post(create_lancamento_residuo),
        )
        .route(
            "/lancamento-residuo/:id/",
            get(get_lancamento_residuo)
                .put(update_lancamento_residuo)
                .delete(delete_lancamento_residuo),
        )
        .route_layer(middleware::from_fn(require_role(Perfil::Ponto)));

    open_routes
        .merge(ponto_coleta_routes)
        .merge(pedido_routes)
        .merge(lancamento_routes)
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Cross-origin policy for the configured front-end origins
///
/// Credentials are allowed so the browser sends the refresh cookie, which
/// rules out wildcards; methods and headers mirror the preflight request.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .nest("/auth", auth_routes(state.clone()))
        .nest("/institutional", institutional_routes(state.clone()))
        .nest("/recycling", recycling_routes(state.clone()))
        .route("/monitoring/healthcheck/", get(health::health_check))
        .route("/openapi.json", get(openapi_json));

    Router::new()
        .route("/", get(health::root))
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.server.cors_origins))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_signup_and_crud_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/v1/auth/login/"));
        assert!(paths.contains_key("/api/v1/auth/signup/{perfil}/"));
        assert!(paths.contains_key("/api/v1/recycling/pedido-doacao/{id}/"));
        assert!(paths.contains_key("/api/v1/institutional/class/"));
    }

    #[test]
    fn test_cors_layer_skips_invalid_origins() {
        // Builds without panicking even when an origin is not a header value.
        let _ = cors_layer(&["http://localhost:3000".to_string(), "bad\norigin".to_string()]);
    }
}
