//! Waste types, collection points, donation requests and drop-offs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Heaviest drop-off the two-decimal weight column can hold
pub const MAX_PESO_KG: f64 = 9999.99;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TipoResiduo {
    pub id: i64,
    #[schema(example = "Plástico")]
    pub nome: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct TipoResiduoCreate {
    #[validate(length(min = 1, max = 100))]
    pub nome: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PontoColeta {
    pub id: i64,
    pub nome: String,
    pub universidade_id: i64,
    pub unidade_id: i64,
    /// Operator in charge of the point
    pub responsavel_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PontoColetaCreate {
    #[validate(length(min = 1, max = 100))]
    pub nome: String,
    pub universidade_id: i64,
    pub unidade_id: i64,
    pub responsavel_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct PontoColetaUpdate {
    #[validate(length(min = 1, max = 100))]
    pub nome: Option<String>,
    pub universidade_id: Option<i64>,
    pub unidade_id: Option<i64>,
    pub responsavel_id: Option<i64>,
}

/// Donation request created by a class leader for a set of students
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PedidoDoacao {
    pub id: i64,
    #[schema(example = "PD-0001")]
    pub codigo: String,
    pub criado_por_id: Option<i64>,
    pub turma_id: i64,
    pub criado_em: DateTime<Utc>,
    pub confirmado: bool,
    /// Ids of the students taking part
    pub alunos: Vec<i64>,
}

/// `pedidos_doacao` row without the student links
#[derive(Debug, Clone, FromRow)]
pub(crate) struct PedidoDoacaoRow {
    pub id: i64,
    pub codigo: String,
    pub criado_por_id: Option<i64>,
    pub turma_id: i64,
    pub criado_em: DateTime<Utc>,
    pub confirmado: bool,
}

impl PedidoDoacaoRow {
    pub(crate) fn with_alunos(self, alunos: Vec<i64>) -> PedidoDoacao {
        PedidoDoacao {
            id: self.id,
            codigo: self.codigo,
            criado_por_id: self.criado_por_id,
            turma_id: self.turma_id,
            criado_em: self.criado_em,
            confirmado: self.confirmado,
            alunos,
        }
    }
}

/// New donation request; unknown student ids are ignored
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PedidoDoacaoCreate {
    #[validate(length(min = 1, max = 10))]
    pub codigo: String,
    pub turma_id: i64,
    #[serde(default)]
    pub alunos: Vec<i64>,
}

/// Partial update; `alunos`, when present, replaces the whole student list
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct PedidoDoacaoUpdate {
    #[validate(length(min = 1, max = 10))]
    pub codigo: Option<String>,
    pub turma_id: Option<i64>,
    pub alunos: Option<Vec<i64>>,
    pub confirmado: Option<bool>,
}

/// Waste drop-off recorded at a collection point; one per donation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LancamentoResiduo {
    pub id: i64,
    pub pedido_id: i64,
    pub ponto_coleta_id: i64,
    pub tipo_residuo_id: i64,
    #[schema(example = 12.5)]
    pub peso_kg: f64,
    pub data: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LancamentoResiduoCreate {
    pub pedido_id: i64,
    pub ponto_coleta_id: i64,
    pub tipo_residuo_id: i64,
    #[validate(range(exclusive_min = 0.0, max = 9999.99))]
    pub peso_kg: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct LancamentoResiduoUpdate {
    pub pedido_id: Option<i64>,
    pub ponto_coleta_id: Option<i64>,
    pub tipo_residuo_id: Option<i64>,
    #[validate(range(exclusive_min = 0.0, max = 9999.99))]
    pub peso_kg: Option<f64>,
}

/// Round a weight to the two decimals the store keeps
pub fn round_peso(peso_kg: f64) -> f64 {
    (peso_kg * 100.0).round() / 100.0
}
