//! Institutional hierarchy: university, unit, course, class

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Universidade {
    pub id: i64,
    #[schema(example = "Universidade Padrão")]
    pub nome: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UniversidadeCreate {
    #[validate(length(min = 1, max = 255))]
    pub nome: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UniversidadeUpdate {
    #[validate(length(min = 1, max = 255))]
    pub nome: Option<String>,
}

/// Campus or unit; removed together with its university
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Unidade {
    pub id: i64,
    #[schema(example = "Campus Principal")]
    pub nome: String,
    pub universidade_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UnidadeCreate {
    #[validate(length(min = 1, max = 255))]
    pub nome: String,
    pub universidade_id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UnidadeUpdate {
    #[validate(length(min = 1, max = 255))]
    pub nome: Option<String>,
    pub universidade_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Curso {
    pub id: i64,
    #[schema(example = "Administração")]
    pub nome: String,
    pub universidade_id: i64,
    pub unidade_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CursoCreate {
    #[validate(length(min = 1, max = 255))]
    pub nome: String,
    pub universidade_id: i64,
    pub unidade_id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CursoUpdate {
    #[validate(length(min = 1, max = 255))]
    pub nome: Option<String>,
    pub universidade_id: Option<i64>,
    pub unidade_id: Option<i64>,
}

/// A class ("turma") within a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Turma {
    pub id: i64,
    #[schema(example = "ADM2024")]
    pub nome: String,
    pub curso_id: i64,
    pub unidade_id: i64,
    pub universidade_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct TurmaCreate {
    #[validate(length(min = 1, max = 100))]
    pub nome: String,
    pub curso_id: i64,
    pub unidade_id: i64,
    pub universidade_id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct TurmaUpdate {
    #[validate(length(min = 1, max = 100))]
    pub nome: Option<String>,
    pub curso_id: Option<i64>,
    pub unidade_id: Option<i64>,
    pub universidade_id: Option<i64>,
}
