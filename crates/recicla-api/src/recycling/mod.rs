//! Collection points, donation requests and waste drop-offs

pub mod models;
pub mod repository;
pub mod service;

pub use models::{
    LancamentoResiduo, LancamentoResiduoCreate, LancamentoResiduoUpdate, PedidoDoacao,
    PedidoDoacaoCreate, PedidoDoacaoUpdate, PontoColeta, PontoColetaCreate, PontoColetaUpdate,
    TipoResiduo, TipoResiduoCreate,
};
pub use repository::RecyclingRepository;
pub use service::RecyclingService;
