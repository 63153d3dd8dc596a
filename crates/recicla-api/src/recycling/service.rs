//! Recycling services

use super::models::*;
use super::repository::RecyclingRepository;
use crate::error::AppError;
use sqlx::SqlitePool;
use validator::Validate;

pub const PONTO_NOT_FOUND: &str = "Ponto não encontrado";
pub const PONTO_COLETA_NOT_FOUND: &str = "Ponto de coleta não encontrado.";
pub const PEDIDO_NOT_FOUND: &str = "Pedido não encontrado";
pub const LANCAMENTO_NOT_FOUND: &str = "Lançamento não encontrado";

pub struct RecyclingService {
    repository: RecyclingRepository,
}

impl RecyclingService {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self {
            repository: RecyclingRepository::new(db_pool),
        }
    }

    pub async fn list_tipos_residuo(&self) -> Result<Vec<TipoResiduo>, AppError> {
        Ok(self.repository.list_tipos_residuo().await?)
    }

    pub async fn create_tipo_residuo(
        &self,
        data: TipoResiduoCreate,
    ) -> Result<TipoResiduo, AppError> {
        data.validate()?;
        Ok(self.repository.create_tipo_residuo(&data).await?)
    }

    pub async fn list_pontos_coleta(&self) -> Result<Vec<PontoColeta>, AppError> {
        Ok(self.repository.list_pontos_coleta().await?)
    }

    pub async fn get_ponto_coleta(&self, id: i64) -> Result<PontoColeta, AppError> {
        self.repository
            .get_ponto_coleta(id)
            .await?
            .ok_or_else(|| AppError::NotFound(PONTO_NOT_FOUND.to_string()))
    }

    pub async fn create_ponto_coleta(
        &self,
        data: PontoColetaCreate,
    ) -> Result<PontoColeta, AppError> {
        data.validate()?;
        Ok(self.repository.create_ponto_coleta(&data).await?)
    }

    pub async fn update_ponto_coleta(
        &self,
        id: i64,
        data: PontoColetaUpdate,
    ) -> Result<PontoColeta, AppError> {
        data.validate()?;
        self.repository
            .update_ponto_coleta(id, &data)
            .await?
            .ok_or_else(|| AppError::NotFound(PONTO_COLETA_NOT_FOUND.to_string()))
    }

    pub async fn delete_ponto_coleta(&self, id: i64) -> Result<(), AppError> {
        if self.repository.delete_ponto_coleta(id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(PONTO_COLETA_NOT_FOUND.to_string()))
        }
    }

    pub async fn list_pedidos_doacao(&self) -> Result<Vec<PedidoDoacao>, AppError> {
        Ok(self.repository.list_pedidos_doacao().await?)
    }

    pub async fn get_pedido_doacao(&self, id: i64) -> Result<PedidoDoacao, AppError> {
        self.repository
            .get_pedido_doacao(id)
            .await?
            .ok_or_else(|| AppError::NotFound(PEDIDO_NOT_FOUND.to_string()))
    }

    /// Create a donation request owned by `criado_por_id`
    pub async fn create_pedido_doacao(
        &self,
        data: PedidoDoacaoCreate,
        criado_por_id: i64,
    ) -> Result<PedidoDoacao, AppError> {
        data.validate()?;
        let pedido = self
            .repository
            .create_pedido_doacao(&data, criado_por_id)
            .await?;

        if pedido.alunos.len() < data.alunos.len() {
            tracing::debug!(
                pedido_id = pedido.id,
                requested = data.alunos.len(),
                linked = pedido.alunos.len(),
                "Skipped unknown or repeated student ids"
            );
        }
        Ok(pedido)
    }

    pub async fn update_pedido_doacao(
        &self,
        id: i64,
        data: PedidoDoacaoUpdate,
    ) -> Result<PedidoDoacao, AppError> {
        data.validate()?;
        self.repository
            .update_pedido_doacao(id, &data)
            .await?
            .ok_or_else(|| AppError::NotFound(PEDIDO_NOT_FOUND.to_string()))
    }

    pub async fn delete_pedido_doacao(&self, id: i64) -> Result<(), AppError> {
        if self.repository.delete_pedido_doacao(id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(PEDIDO_NOT_FOUND.to_string()))
        }
    }

    pub async fn list_lancamentos_residuo(&self) -> Result<Vec<LancamentoResiduo>, AppError> {
        Ok(self.repository.list_lancamentos_residuo().await?)
    }

    pub async fn get_lancamento_residuo(&self, id: i64) -> Result<LancamentoResiduo, AppError> {
        self.repository
            .get_lancamento_residuo(id)
            .await?
            .ok_or_else(|| AppError::NotFound(LANCAMENTO_NOT_FOUND.to_string()))
    }

    pub async fn create_lancamento_residuo(
        &self,
        data: LancamentoResiduoCreate,
    ) -> Result<LancamentoResiduo, AppError> {
        data.validate()?;
        Ok(self.repository.create_lancamento_residuo(&data).await?)
    }

    pub async fn update_lancamento_residuo(
        &self,
        id: i64,
        data: LancamentoResiduoUpdate,
    ) -> Result<LancamentoResiduo, AppError> {
        data.validate()?;
        self.repository
            .update_lancamento_residuo(id, &data)
            .await?
            .ok_or_else(|| AppError::NotFound(LANCAMENTO_NOT_FOUND.to_string()))
    }

    pub async fn delete_lancamento_residuo(&self, id: i64) -> Result<(), AppError> {
        if self.repository.delete_lancamento_residuo(id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(LANCAMENTO_NOT_FOUND.to_string()))
        }
    }
}
