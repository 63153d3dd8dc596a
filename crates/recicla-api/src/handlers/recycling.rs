//! Recycling CRUD handlers
//!
//! Waste types are open to any active user. Collection points belong to
//! `ADMIN_UNI`, donation requests to `CHEFE` and drop-offs to `PONTO`; the
//! router applies those gates.

use super::DetailResponse;
use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::extract::{AppJson, AppPath};
use crate::recycling::*;
use crate::state::AppState;
use axum::{
    extract::State,
    response::IntoResponse,
    Extension, Json,
};
use std::sync::Arc;

fn service(state: &AppState) -> RecyclingService {
    RecyclingService::new(state.db.clone())
}

// ============================================================================
// TipoResiduo
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/recycling/tipo-residuo/",
    tag = "recycling",
    responses((status = 200, description = "All waste types", body = [TipoResiduo])),
    security(("bearer_auth" = []))
)]
pub async fn list_tipos_residuo(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).list_tipos_residuo().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/recycling/tipo-residuo/",
    tag = "recycling",
    request_body = TipoResiduoCreate,
    responses((status = 200, description = "Waste type created", body = TipoResiduo)),
    security(("bearer_auth" = []))
)]
pub async fn create_tipo_residuo(
    State(state): State<Arc<AppState>>,
    AppJson(data): AppJson<TipoResiduoCreate>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).create_tipo_residuo(data).await?))
}

// ============================================================================
// PontoColeta
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/recycling/pontos-coleta/",
    tag = "recycling",
    responses((status = 200, description = "All collection points", body = [PontoColeta])),
    security(("bearer_auth" = []))
)]
pub async fn list_pontos_coleta(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).list_pontos_coleta().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/recycling/pontos-coleta/",
    tag = "recycling",
    request_body = PontoColetaCreate,
    responses((status = 200, description = "Collection point created", body = PontoColeta)),
    security(("bearer_auth" = []))
)]
pub async fn create_ponto_coleta(
    State(state): State<Arc<AppState>>,
    AppJson(data): AppJson<PontoColetaCreate>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).create_ponto_coleta(data).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/recycling/ponto-coleta/{id}/",
    tag = "recycling",
    params(("id" = i64, Path, description = "Collection point id")),
    responses(
        (status = 200, description = "Collection point", body = PontoColeta),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_ponto_coleta(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).get_ponto_coleta(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/recycling/ponto-coleta/{id}/",
    tag = "recycling",
    params(("id" = i64, Path, description = "Collection point id")),
    request_body = PontoColetaUpdate,
    responses(
        (status = 200, description = "Collection point updated", body = PontoColeta),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_ponto_coleta(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
    AppJson(data): AppJson<PontoColetaUpdate>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).update_ponto_coleta(id, data).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/recycling/ponto-coleta/{id}/",
    tag = "recycling",
    params(("id" = i64, Path, description = "Collection point id")),
    responses(
        (status = 200, description = "Collection point deleted", body = DetailResponse),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_ponto_coleta(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    service(&state).delete_ponto_coleta(id).await?;
    Ok(Json(DetailResponse::new("Ponto de coleta deletado com sucesso")))
}

// ============================================================================
// PedidoDoacao
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/recycling/pedido-doacao/",
    tag = "recycling",
    responses((status = 200, description = "All donation requests", body = [PedidoDoacao])),
    security(("bearer_auth" = []))
)]
pub async fn list_pedidos_doacao(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).list_pedidos_doacao().await?))
}

/// Create a donation request owned by the caller
#[utoipa::path(
    post,
    path = "/api/v1/recycling/pedido-doacao/",
    tag = "recycling",
    request_body = PedidoDoacaoCreate,
    responses(
        (status = 200, description = "Donation request created", body = PedidoDoacao),
        (status = 400, description = "Duplicate code or unknown class", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_pedido_doacao(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    AppJson(data): AppJson<PedidoDoacaoCreate>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).create_pedido_doacao(data, user.id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/recycling/pedido-doacao/{id}/",
    tag = "recycling",
    params(("id" = i64, Path, description = "Donation request id")),
    responses(
        (status = 200, description = "Donation request", body = PedidoDoacao),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_pedido_doacao(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).get_pedido_doacao(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/recycling/pedido-doacao/{id}/",
    tag = "recycling",
    params(("id" = i64, Path, description = "Donation request id")),
    request_body = PedidoDoacaoUpdate,
    responses(
        (status = 200, description = "Donation request updated", body = PedidoDoacao),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_pedido_doacao(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
    AppJson(data): AppJson<PedidoDoacaoUpdate>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).update_pedido_doacao(id, data).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/recycling/pedido-doacao/{id}/",
    tag = "recycling",
    params(("id" = i64, Path, description = "Donation request id")),
    responses(
        (status = 200, description = "Donation request deleted", body = DetailResponse),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_pedido_doacao(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    service(&state).delete_pedido_doacao(id).await?;
    Ok(Json(DetailResponse::new("Pedido deletado com sucesso")))
}

// ============================================================================
// LancamentoResiduo
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/recycling/lancamento-residuo/",
    tag = "recycling",
    responses((status = 200, description = "All drop-offs", body = [LancamentoResiduo])),
    security(("bearer_auth" = []))
)]
pub async fn list_lancamentos_residuo(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).list_lancamentos_residuo().await?))
}

/// Record a drop-off; the weight is stored with two decimals
#[utoipa::path(
    post,
    path = "/api/v1/recycling/lancamento-residuo/",
    tag = "recycling",
    request_body = LancamentoResiduoCreate,
    responses(
        (status = 200, description = "Drop-off recorded", body = LancamentoResiduo),
        (status = 400, description = "Invalid weight or request already has a drop-off", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_lancamento_residuo(
    State(state): State<Arc<AppState>>,
    AppJson(data): AppJson<LancamentoResiduoCreate>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).create_lancamento_residuo(data).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/recycling/lancamento-residuo/{id}/",
    tag = "recycling",
    params(("id" = i64, Path, description = "Drop-off id")),
    responses(
        (status = 200, description = "Drop-off", body = LancamentoResiduo),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_lancamento_residuo(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).get_lancamento_residuo(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/recycling/lancamento-residuo/{id}/",
    tag = "recycling",
    params(("id" = i64, Path, description = "Drop-off id")),
    request_body = LancamentoResiduoUpdate,
    responses(
        (status = 200, description = "Drop-off updated", body = LancamentoResiduo),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_lancamento_residuo(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
    AppJson(data): AppJson<LancamentoResiduoUpdate>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(service(&state).update_lancamento_residuo(id, data).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/recycling/lancamento-residuo/{id}/",
    tag = "recycling",
    params(("id" = i64, Path, description = "Drop-off id")),
    responses(
        (status = 200, description = "Drop-off deleted", body = DetailResponse),
        (status = 404, description = "Not found", body = crate::error::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_lancamento_residuo(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    service(&state).delete_lancamento_residuo(id).await?;
    Ok(Json(DetailResponse::new("Lançamento deletado com sucesso")))
}
