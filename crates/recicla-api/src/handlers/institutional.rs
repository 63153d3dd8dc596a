//! Institutional CRUD handlers
//!
//! Every route requires an active user; writes that reshape the hierarchy
//! (anything under `/university/`, and PUT/DELETE elsewhere) are limited to
//! `ADMIN_UNI` by the router.

use super::DetailResponse;
use crate::error::AppError;
use crate::extract::{AppJson, AppPath};
use crate::institutional::*;
use crate::state::AppState;
use axum::{
    extract::State,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

fn service(state: &AppState) -> InstitutionalService {
    InstitutionalService::new(state.db.clone())
}

// ============================================================================
// Universidade
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/institutional/university/",
    tag = "institutional",
    responses((status = 200, description = "All universities", body = [Universidade])),
    security(("bearer_auth" = []))
)]
pub async fn list_universidades(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).list_universidades().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/institutional/university/",
    tag = "institutional",
    request_body = UniversidadeCreate,
    responses(
        (status = 200, description = "University created", body = Universidade),
        (status = 403, description = "Requires ADMIN_UNI", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_universidade(
    State(state): State<Arc<AppState>>,
    AppJson(data): AppJson<UniversidadeCreate>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).create_universidade(data).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/institutional/university/{id}/",
    tag = "institutional",
    params(("id" = i64, Path, description = "University id")),
    responses(
        (status = 200, description = "University", body = Universidade),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_universidade(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).get_universidade(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/institutional/university/{id}/",
    tag = "institutional",
    params(("id" = i64, Path, description = "University id")),
    request_body = UniversidadeUpdate,
    responses(
        (status = 200, description = "University updated", body = Universidade),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_universidade(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
    AppJson(data): AppJson<UniversidadeUpdate>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).update_universidade(id, data).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/institutional/university/{id}/",
    tag = "institutional",
    params(("id" = i64, Path, description = "University id")),
    responses(
        (status = 200, description = "University deleted", body = DetailResponse),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_universidade(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    service(&state).delete_universidade(id).await?;
    Ok(Json(DetailResponse::new("Universidade deletada com sucesso")))
}

// ============================================================================
// Unidade
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/institutional/unit/",
    tag = "institutional",
    responses((status = 200, description = "All units", body = [Unidade])),
    security(("bearer_auth" = []))
)]
pub async fn list_unidades(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).list_unidades().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/institutional/unit/",
    tag = "institutional",
    request_body = UnidadeCreate,
    responses((status = 200, description = "Unit created", body = Unidade)),
    security(("bearer_auth" = []))
)]
pub async fn create_unidade(
    State(state): State<Arc<AppState>>,
    AppJson(data): AppJson<UnidadeCreate>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).create_unidade(data).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/institutional/unit/{id}/",
    tag = "institutional",
    params(("id" = i64, Path, description = "Unit id")),
    responses(
        (status = 200, description = "Unit", body = Unidade),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_unidade(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).get_unidade(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/institutional/unit/{id}/",
    tag = "institutional",
    params(("id" = i64, Path, description = "Unit id")),
    request_body = UnidadeUpdate,
    responses(
        (status = 200, description = "Unit updated", body = Unidade),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_unidade(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
    AppJson(data): AppJson<UnidadeUpdate>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).update_unidade(id, data).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/institutional/unit/{id}/",
    tag = "institutional",
    params(("id" = i64, Path, description = "Unit id")),
    responses(
        (status = 200, description = "Unit deleted", body = DetailResponse),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_unidade(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    service(&state).delete_unidade(id).await?;
    Ok(Json(DetailResponse::new("Unidade deletada com sucesso")))
}

// ============================================================================
// Curso
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/institutional/course/",
    tag = "institutional",
    responses((status = 200, description = "All courses", body = [Curso])),
    security(("bearer_auth" = []))
)]
pub async fn list_cursos(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).list_cursos().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/institutional/course/",
    tag = "institutional",
    request_body = CursoCreate,
    responses((status = 200, description = "Course created", body = Curso)),
    security(("bearer_auth" = []))
)]
pub async fn create_curso(
    State(state): State<Arc<AppState>>,
    AppJson(data): AppJson<CursoCreate>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).create_curso(data).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/institutional/course/{id}/",
    tag = "institutional",
    params(("id" = i64, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course", body = Curso),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_curso(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).get_curso(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/institutional/course/{id}/",
    tag = "institutional",
    params(("id" = i64, Path, description = "Course id")),
    request_body = CursoUpdate,
    responses(
        (status = 200, description = "Course updated", body = Curso),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_curso(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
    AppJson(data): AppJson<CursoUpdate>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).update_curso(id, data).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/institutional/course/{id}/",
    tag = "institutional",
    params(("id" = i64, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course deleted", body = DetailResponse),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_curso(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    service(&state).delete_curso(id).await?;
    Ok(Json(DetailResponse::new("Curso deletado com sucesso")))
}

// ============================================================================
// Turma
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/institutional/class/",
    tag = "institutional",
    responses((status = 200, description = "All classes", body = [Turma])),
    security(("bearer_auth" = []))
)]
pub async fn list_turmas(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).list_turmas().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/institutional/class/",
    tag = "institutional",
    request_body = TurmaCreate,
    responses((status = 200, description = "Class created", body = Turma)),
    security(("bearer_auth" = []))
)]
pub async fn create_turma(
    State(state): State<Arc<AppState>>,
    AppJson(data): AppJson<TurmaCreate>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).create_turma(data).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/institutional/class/{id}/",
    tag = "institutional",
    params(("id" = i64, Path, description = "Class id")),
    responses(
        (status = 200, description = "Class", body = Turma),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_turma(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).get_turma(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/institutional/class/{id}/",
    tag = "institutional",
    params(("id" = i64, Path, description = "Class id")),
    request_body = TurmaUpdate,
    responses(
        (status = 200, description = "Class updated", body = Turma),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_turma(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
    AppJson(data): AppJson<TurmaUpdate>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).update_turma(id, data).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/institutional/class/{id}/",
    tag = "institutional",
    params(("id" = i64, Path, description = "Class id")),
    responses(
        (status = 200, description = "Class deleted", body = DetailResponse),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_turma(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    service(&state).delete_turma(id).await?;
    Ok(Json(DetailResponse::new("Turma deletada com sucesso")))
}
