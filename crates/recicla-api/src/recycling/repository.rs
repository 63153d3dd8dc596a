//! SQLite access for the recycling tables

use super::models::*;
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};

const PEDIDO_COLUMNS: &str = "id, codigo, criado_por_id, turma_id, criado_em, confirmado";
const LANCAMENTO_COLUMNS: &str = "id, pedido_id, ponto_coleta_id, tipo_residuo_id, peso_kg, data";

#[derive(Clone)]
pub struct RecyclingRepository {
    pool: SqlitePool,
}

impl RecyclingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn delete_row(&self, table: &str, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = ?"))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ------------------------------------------------------------------
    // TipoResiduo
    // ------------------------------------------------------------------

    pub async fn list_tipos_residuo(&self) -> Result<Vec<TipoResiduo>, sqlx::Error> {
        sqlx::query_as("SELECT id, nome FROM tipos_residuo ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn create_tipo_residuo(
        &self,
        data: &TipoResiduoCreate,
    ) -> Result<TipoResiduo, sqlx::Error> {
        sqlx::query_as("INSERT INTO tipos_residuo (nome) VALUES (?) RETURNING id, nome")
            .bind(&data.nome)
            .fetch_one(&self.pool)
            .await
    }

    // ------------------------------------------------------------------
    // PontoColeta
    // ------------------------------------------------------------------

    pub async fn list_pontos_coleta(&self) -> Result<Vec<PontoColeta>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, nome, universidade_id, unidade_id, responsavel_id \
             FROM pontos_coleta ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_ponto_coleta(&self, id: i64) -> Result<Option<PontoColeta>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, nome, universidade_id, unidade_id, responsavel_id \
             FROM pontos_coleta WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn create_ponto_coleta(
        &self,
        data: &PontoColetaCreate,
    ) -> Result<PontoColeta, sqlx::Error> {
        sqlx::query_as(
            "INSERT INTO pontos_coleta (nome, universidade_id, unidade_id, responsavel_id) \
             VALUES (?, ?, ?, ?) \
             RETURNING id, nome, universidade_id, unidade_id, responsavel_id",
        )
        .bind(&data.nome)
        .bind(data.universidade_id)
        .bind(data.unidade_id)
        .bind(data.responsavel_id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update_ponto_coleta(
        &self,
        id: i64,
        data: &PontoColetaUpdate,
    ) -> Result<Option<PontoColeta>, sqlx::Error> {
        sqlx::query_as(
            "UPDATE pontos_coleta SET nome = COALESCE(?, nome), \
             universidade_id = COALESCE(?, universidade_id), \
             unidade_id = COALESCE(?, unidade_id), \
             responsavel_id = COALESCE(?, responsavel_id) \
             WHERE id = ? \
             RETURNING id, nome, universidade_id, unidade_id, responsavel_id",
        )
        .bind(&data.nome)
        .bind(data.universidade_id)
        .bind(data.unidade_id)
        .bind(data.responsavel_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete_ponto_coleta(&self, id: i64) -> Result<bool, sqlx::Error> {
        self.delete_row("pontos_coleta", id).await
    }

    // ------------------------------------------------------------------
    // PedidoDoacao
    // ------------------------------------------------------------------

    async fn alunos_of(&self, pedido_id: i64) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT user_id FROM pedido_doacao_alunos WHERE pedido_doacao_id = ? ORDER BY user_id",
        )
        .bind(pedido_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Replace the student links of a request; ids with no user are skipped
    async fn link_alunos(
        tx: &mut Transaction<'_, Sqlite>,
        pedido_id: i64,
        alunos: &[i64],
    ) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query("DELETE FROM pedido_doacao_alunos WHERE pedido_doacao_id = ?")
            .bind(pedido_id)
            .execute(&mut **tx)
            .await?;

        for aluno_id in alunos {
            sqlx::query(
                "INSERT OR IGNORE INTO pedido_doacao_alunos (pedido_doacao_id, user_id) \
                 SELECT ?, id FROM users WHERE id = ?",
            )
            .bind(pedido_id)
            .bind(aluno_id)
            .execute(&mut **tx)
            .await?;
        }

        sqlx::query_scalar(
            "SELECT user_id FROM pedido_doacao_alunos WHERE pedido_doacao_id = ? ORDER BY user_id",
        )
        .bind(pedido_id)
        .fetch_all(&mut **tx)
        .await
    }

    pub async fn list_pedidos_doacao(&self) -> Result<Vec<PedidoDoacao>, sqlx::Error> {
        let rows: Vec<PedidoDoacaoRow> =
            sqlx::query_as(&format!("SELECT {PEDIDO_COLUMNS} FROM pedidos_doacao ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;

        let mut pedidos = Vec::with_capacity(rows.len());
        for row in rows {
            let alunos = self.alunos_of(row.id).await?;
            pedidos.push(row.with_alunos(alunos));
        }
        Ok(pedidos)
    }

    pub async fn get_pedido_doacao(&self, id: i64) -> Result<Option<PedidoDoacao>, sqlx::Error> {
        let row: Option<PedidoDoacaoRow> =
            sqlx::query_as(&format!("SELECT {PEDIDO_COLUMNS} FROM pedidos_doacao WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => {
                let alunos = self.alunos_of(row.id).await?;
                Ok(Some(row.with_alunos(alunos)))
            }
            None => Ok(None),
        }
    }

    /// Insert a request and its student links in one transaction
    pub async fn create_pedido_doacao(
        &self,
        data: &PedidoDoacaoCreate,
        criado_por_id: i64,
    ) -> Result<PedidoDoacao, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let row: PedidoDoacaoRow = sqlx::query_as(&format!(
            "INSERT INTO pedidos_doacao (codigo, criado_por_id, turma_id, criado_em, confirmado) \
             VALUES (?, ?, ?, ?, 0) RETURNING {PEDIDO_COLUMNS}"
        ))
        .bind(&data.codigo)
        .bind(criado_por_id)
        .bind(data.turma_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        let alunos = Self::link_alunos(&mut tx, row.id, &data.alunos).await?;
        tx.commit().await?;

        Ok(row.with_alunos(alunos))
    }

    pub async fn update_pedido_doacao(
        &self,
        id: i64,
        data: &PedidoDoacaoUpdate,
    ) -> Result<Option<PedidoDoacao>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let row: Option<PedidoDoacaoRow> = sqlx::query_as(&format!(
            "UPDATE pedidos_doacao SET codigo = COALESCE(?, codigo), \
             turma_id = COALESCE(?, turma_id), \
             confirmado = COALESCE(?, confirmado) \
             WHERE id = ? RETURNING {PEDIDO_COLUMNS}"
        ))
        .bind(&data.codigo)
        .bind(data.turma_id)
        .bind(data.confirmado)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let alunos = match &data.alunos {
            Some(alunos) => Self::link_alunos(&mut tx, row.id, alunos).await?,
            None => {
                sqlx::query_scalar(
                    "SELECT user_id FROM pedido_doacao_alunos \
                     WHERE pedido_doacao_id = ? ORDER BY user_id",
                )
                .bind(row.id)
                .fetch_all(&mut *tx)
                .await?
            }
        };
        tx.commit().await?;

        Ok(Some(row.with_alunos(alunos)))
    }

    pub async fn delete_pedido_doacao(&self, id: i64) -> Result<bool, sqlx::Error> {
        self.delete_row("pedidos_doacao", id).await
    }

    // ------------------------------------------------------------------
    // LancamentoResiduo
    // ------------------------------------------------------------------

    pub async fn list_lancamentos_residuo(&self) -> Result<Vec<LancamentoResiduo>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {LANCAMENTO_COLUMNS} FROM lancamentos_residuo ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_lancamento_residuo(
        &self,
        id: i64,
    ) -> Result<Option<LancamentoResiduo>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {LANCAMENTO_COLUMNS} FROM lancamentos_residuo WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn create_lancamento_residuo(
        &self,
        data: &LancamentoResiduoCreate,
    ) -> Result<LancamentoResiduo, sqlx::Error> {
        sqlx::query_as(&format!(
            "INSERT INTO lancamentos_residuo (pedido_id, ponto_coleta_id, tipo_residuo_id, peso_kg, data) \
             VALUES (?, ?, ?, ?, ?) RETURNING {LANCAMENTO_COLUMNS}"
        ))
        .bind(data.pedido_id)
        .bind(data.ponto_coleta_id)
        .bind(data.tipo_residuo_id)
        .bind(round_peso(data.peso_kg))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update_lancamento_residuo(
        &self,
        id: i64,
        data: &LancamentoResiduoUpdate,
    ) -> Result<Option<LancamentoResiduo>, sqlx::Error> {
        sqlx::query_as(&format!(
            "UPDATE lancamentos_residuo SET pedido_id = COALESCE(?, pedido_id), \
             ponto_coleta_id = COALESCE(?, ponto_coleta_id), \
             tipo_residuo_id = COALESCE(?, tipo_residuo_id), \
             peso_kg = COALESCE(?, peso_kg) \
             WHERE id = ? RETURNING {LANCAMENTO_COLUMNS}"
        ))
        .bind(data.pedido_id)
        .bind(data.ponto_coleta_id)
        .bind(data.tipo_residuo_id)
        .bind(data.peso_kg.map(round_peso))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete_lancamento_residuo(&self, id: i64) -> Result<bool, sqlx::Error> {
        self.delete_row("lancamentos_residuo", id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    struct Fixture {
        repo: RecyclingRepository,
        pool: SqlitePool,
        turma_id: i64,
        aluno_ids: Vec<i64>,
    }

    async fn fixture() -> Fixture {
        let pool = db::connect_in_memory().await.unwrap();
        db::run_migrations(&pool).await.unwrap();

        sqlx::query("INSERT INTO universidades (id, nome) VALUES (1, 'UFX')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO unidades (id, nome, universidade_id) VALUES (1, 'Campus', 1)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO cursos (id, nome, universidade_id, unidade_id) VALUES (1, 'ADM', 1, 1)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO turmas (id, nome, curso_id, unidade_id, universidade_id) \
             VALUES (1, 'ADM2024', 1, 1, 1)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let mut aluno_ids = Vec::new();
        for name in ["chefe", "a1", "a2"] {
            let id: i64 = sqlx::query_scalar(
                "INSERT INTO users (username, email, hashed_password, date_joined, perfil) \
                 VALUES (?, ?, 'h', '2024-01-01T00:00:00Z', 'ALUNO') RETURNING id",
            )
            .bind(name)
            .bind(format!("{name}@example.com"))
            .fetch_one(&pool)
            .await
            .unwrap();
            aluno_ids.push(id);
        }

        Fixture {
            repo: RecyclingRepository::new(pool.clone()),
            pool,
            turma_id: 1,
            aluno_ids,
        }
    }

    #[tokio::test]
    async fn test_create_pedido_ignores_unknown_alunos() {
        let f = fixture().await;
        let chefe = f.aluno_ids[0];

        let pedido = f
            .repo
            .create_pedido_doacao(
                &PedidoDoacaoCreate {
                    codigo: "PD1".to_string(),
                    turma_id: f.turma_id,
                    alunos: vec![f.aluno_ids[1], 9_999, f.aluno_ids[2], f.aluno_ids[1]],
                },
                chefe,
            )
            .await
            .unwrap();

        assert_eq!(pedido.criado_por_id, Some(chefe));
        assert!(!pedido.confirmado);
        assert_eq!(pedido.alunos, vec![f.aluno_ids[1], f.aluno_ids[2]]);

        let fetched = f.repo.get_pedido_doacao(pedido.id).await.unwrap().unwrap();
        assert_eq!(fetched, pedido);
    }

    #[tokio::test]
    async fn test_duplicate_codigo_rolls_back() {
        let f = fixture().await;
        let data = PedidoDoacaoCreate {
            codigo: "PD1".to_string(),
            turma_id: f.turma_id,
            alunos: vec![f.aluno_ids[1]],
        };

        f.repo.create_pedido_doacao(&data, f.aluno_ids[0]).await.unwrap();
        let err = f
            .repo
            .create_pedido_doacao(&data, f.aluno_ids[0])
            .await
            .unwrap_err();
        assert!(err.as_database_error().unwrap().is_unique_violation());

        let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pedido_doacao_alunos")
            .fetch_one(&f.pool)
            .await
            .unwrap();
        assert_eq!(links, 1);
    }

    #[tokio::test]
    async fn test_update_pedido_replaces_alunos_only_when_given() {
        let f = fixture().await;
        let pedido = f
            .repo
            .create_pedido_doacao(
                &PedidoDoacaoCreate {
                    codigo: "PD1".to_string(),
                    turma_id: f.turma_id,
                    alunos: vec![f.aluno_ids[1]],
                },
                f.aluno_ids[0],
            )
            .await
            .unwrap();

        let confirmed = f
            .repo
            .update_pedido_doacao(
                pedido.id,
                &PedidoDoacaoUpdate {
                    confirmado: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(confirmed.confirmado);
        assert_eq!(confirmed.alunos, vec![f.aluno_ids[1]]);

        let relinked = f
            .repo
            .update_pedido_doacao(
                pedido.id,
                &PedidoDoacaoUpdate {
                    alunos: Some(vec![f.aluno_ids[2]]),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(relinked.alunos, vec![f.aluno_ids[2]]);
        assert!(relinked.confirmado);

        assert!(f
            .repo
            .update_pedido_doacao(999, &PedidoDoacaoUpdate::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_lancamento_one_per_pedido() {
        let f = fixture().await;
        let pedido = f
            .repo
            .create_pedido_doacao(
                &PedidoDoacaoCreate {
                    codigo: "PD1".to_string(),
                    turma_id: f.turma_id,
                    alunos: vec![],
                },
                f.aluno_ids[0],
            )
            .await
            .unwrap();
        let ponto = f
            .repo
            .create_ponto_coleta(&PontoColetaCreate {
                nome: "Bloco A".to_string(),
                universidade_id: 1,
                unidade_id: 1,
                responsavel_id: None,
            })
            .await
            .unwrap();
        let tipo = f
            .repo
            .create_tipo_residuo(&TipoResiduoCreate {
                nome: "Vidro".to_string(),
            })
            .await
            .unwrap();

        let data = LancamentoResiduoCreate {
            pedido_id: pedido.id,
            ponto_coleta_id: ponto.id,
            tipo_residuo_id: tipo.id,
            peso_kg: 3.456,
        };
        let lancamento = f.repo.create_lancamento_residuo(&data).await.unwrap();
        assert_eq!(lancamento.peso_kg, 3.46);

        let err = f.repo.create_lancamento_residuo(&data).await.unwrap_err();
        assert!(err.as_database_error().unwrap().is_unique_violation());
    }

    #[tokio::test]
    async fn test_deleting_pedido_drops_links() {
        let f = fixture().await;
        let pedido = f
            .repo
            .create_pedido_doacao(
                &PedidoDoacaoCreate {
                    codigo: "PD1".to_string(),
                    turma_id: f.turma_id,
                    alunos: vec![f.aluno_ids[1], f.aluno_ids[2]],
                },
                f.aluno_ids[0],
            )
            .await
            .unwrap();

        assert!(f.repo.delete_pedido_doacao(pedido.id).await.unwrap());
        assert!(f.repo.list_pedidos_doacao().await.unwrap().is_empty());

        let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pedido_doacao_alunos")
            .fetch_one(&f.pool)
            .await
            .unwrap();
        assert_eq!(links, 0);
    }
}
