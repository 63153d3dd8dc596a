//! Institutional hierarchy: university → unit → course → class

pub mod models;
pub mod repository;
pub mod service;

pub use models::{
    Curso, CursoCreate, CursoUpdate, Turma, TurmaCreate, TurmaUpdate, Unidade, UnidadeCreate,
    UnidadeUpdate, Universidade, UniversidadeCreate, UniversidadeUpdate,
};
pub use repository::InstitutionalRepository;
pub use service::InstitutionalService;
