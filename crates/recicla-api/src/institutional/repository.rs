//! SQLite access for the institutional tables

use super::models::*;
use sqlx::SqlitePool;

/// Remove one row by id from `table`; returns whether a row was removed
async fn delete_row(pool: &SqlitePool, table: &str, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = ?"))
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[derive(Clone)]
pub struct InstitutionalRepository {
    pool: SqlitePool,
}

impl InstitutionalRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ------------------------------------------------------------------
    // Universidade
    // ------------------------------------------------------------------

    pub async fn list_universidades(&self) -> Result<Vec<Universidade>, sqlx::Error> {
        sqlx::query_as("SELECT id, nome FROM universidades ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn get_universidade(&self, id: i64) -> Result<Option<Universidade>, sqlx::Error> {
        sqlx::query_as("SELECT id, nome FROM universidades WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_universidade_by_nome(
        &self,
        nome: &str,
    ) -> Result<Option<Universidade>, sqlx::Error> {
        sqlx::query_as("SELECT id, nome FROM universidades WHERE nome = ? ORDER BY id LIMIT 1")
            .bind(nome)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn create_universidade(
        &self,
        data: &UniversidadeCreate,
    ) -> Result<Universidade, sqlx::Error> {
        sqlx::query_as("INSERT INTO universidades (nome) VALUES (?) RETURNING id, nome")
            .bind(&data.nome)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn update_universidade(
        &self,
        id: i64,
        data: &UniversidadeUpdate,
    ) -> Result<Option<Universidade>, sqlx::Error> {
        sqlx::query_as(
            "UPDATE universidades SET nome = COALESCE(?, nome) WHERE id = ? RETURNING id, nome",
        )
        .bind(&data.nome)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete_universidade(&self, id: i64) -> Result<bool, sqlx::Error> {
        delete_row(&self.pool, "universidades", id).await
    }

    // ------------------------------------------------------------------
    // Unidade
    // ------------------------------------------------------------------

    pub async fn list_unidades(&self) -> Result<Vec<Unidade>, sqlx::Error> {
        sqlx::query_as("SELECT id, nome, universidade_id FROM unidades ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn get_unidade(&self, id: i64) -> Result<Option<Unidade>, sqlx::Error> {
        sqlx::query_as("SELECT id, nome, universidade_id FROM unidades WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_unidade_by_nome(
        &self,
        universidade_id: i64,
        nome: &str,
    ) -> Result<Option<Unidade>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, nome, universidade_id FROM unidades \
             WHERE universidade_id = ? AND nome = ? ORDER BY id LIMIT 1",
        )
        .bind(universidade_id)
        .bind(nome)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn create_unidade(&self, data: &UnidadeCreate) -> Result<Unidade, sqlx::Error> {
        sqlx::query_as(
            "INSERT INTO unidades (nome, universidade_id) VALUES (?, ?) \
             RETURNING id, nome, universidade_id",
        )
        .bind(&data.nome)
        .bind(data.universidade_id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update_unidade(
        &self,
        id: i64,
        data: &UnidadeUpdate,
    ) -> Result<Option<Unidade>, sqlx::Error> {
        sqlx::query_as(
            "UPDATE unidades SET nome = COALESCE(?, nome), \
             universidade_id = COALESCE(?, universidade_id) \
             WHERE id = ? RETURNING id, nome, universidade_id",
        )
        .bind(&data.nome)
        .bind(data.universidade_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete_unidade(&self, id: i64) -> Result<bool, sqlx::Error> {
        delete_row(&self.pool, "unidades", id).await
    }

    // ------------------------------------------------------------------
    // Curso
    // ------------------------------------------------------------------

    pub async fn list_cursos(&self) -> Result<Vec<Curso>, sqlx::Error> {
        sqlx::query_as("SELECT id, nome, universidade_id, unidade_id FROM cursos ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn get_curso(&self, id: i64) -> Result<Option<Curso>, sqlx::Error> {
        sqlx::query_as("SELECT id, nome, universidade_id, unidade_id FROM cursos WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_curso_by_nome(
        &self,
        unidade_id: i64,
        nome: &str,
    ) -> Result<Option<Curso>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, nome, universidade_id, unidade_id FROM cursos \
             WHERE unidade_id = ? AND nome = ? ORDER BY id LIMIT 1",
        )
        .bind(unidade_id)
        .bind(nome)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn create_curso(&self, data: &CursoCreate) -> Result<Curso, sqlx::Error> {
        sqlx::query_as(
            "INSERT INTO cursos (nome, universidade_id, unidade_id) VALUES (?, ?, ?) \
             RETURNING id, nome, universidade_id, unidade_id",
        )
        .bind(&data.nome)
        .bind(data.universidade_id)
        .bind(data.unidade_id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update_curso(
        &self,
        id: i64,
        data: &CursoUpdate,
    ) -> Result<Option<Curso>, sqlx::Error> {
        sqlx::query_as(
            "UPDATE cursos SET nome = COALESCE(?, nome), \
             universidade_id = COALESCE(?, universidade_id), \
             unidade_id = COALESCE(?, unidade_id) \
             WHERE id = ? RETURNING id, nome, universidade_id, unidade_id",
        )
        .bind(&data.nome)
        .bind(data.universidade_id)
        .bind(data.unidade_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete_curso(&self, id: i64) -> Result<bool, sqlx::Error> {
        delete_row(&self.pool, "cursos", id).await
    }

    // ------------------------------------------------------------------
    // Turma
    // ------------------------------------------------------------------

    pub async fn list_turmas(&self) -> Result<Vec<Turma>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, nome, curso_id, unidade_id, universidade_id FROM turmas ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_turma(&self, id: i64) -> Result<Option<Turma>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, nome, curso_id, unidade_id, universidade_id FROM turmas WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn find_turma_by_nome(
        &self,
        curso_id: i64,
        nome: &str,
    ) -> Result<Option<Turma>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, nome, curso_id, unidade_id, universidade_id FROM turmas \
             WHERE curso_id = ? AND nome = ? ORDER BY id LIMIT 1",
        )
        .bind(curso_id)
        .bind(nome)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn create_turma(&self, data: &TurmaCreate) -> Result<Turma, sqlx::Error> {
        sqlx::query_as(
            "INSERT INTO turmas (nome, curso_id, unidade_id, universidade_id) VALUES (?, ?, ?, ?) \
             RETURNING id, nome, curso_id, unidade_id, universidade_id",
        )
        .bind(&data.nome)
        .bind(data.curso_id)
        .bind(data.unidade_id)
        .bind(data.universidade_id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update_turma(
        &self,
        id: i64,
        data: &TurmaUpdate,
    ) -> Result<Option<Turma>, sqlx::Error> {
        sqlx::query_as(
            "UPDATE turmas SET nome = COALESCE(?, nome), \
             curso_id = COALESCE(?, curso_id), \
             unidade_id = COALESCE(?, unidade_id), \
             universidade_id = COALESCE(?, universidade_id) \
             WHERE id = ? RETURNING id, nome, curso_id, unidade_id, universidade_id",
        )
        .bind(&data.nome)
        .bind(data.curso_id)
        .bind(data.unidade_id)
        .bind(data.universidade_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete_turma(&self, id: i64) -> Result<bool, sqlx::Error> {
        delete_row(&self.pool, "turmas", id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn repo() -> InstitutionalRepository {
        let pool = db::connect_in_memory().await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        InstitutionalRepository::new(pool)
    }

    #[tokio::test]
    async fn test_hierarchy_round_trip() {
        let repo = repo().await;

        let uni = repo
            .create_universidade(&UniversidadeCreate {
                nome: "UFX".to_string(),
            })
            .await
            .unwrap();
        let unidade = repo
            .create_unidade(&UnidadeCreate {
                nome: "Campus Norte".to_string(),
                universidade_id: uni.id,
            })
            .await
            .unwrap();
        let curso = repo
            .create_curso(&CursoCreate {
                nome: "Direito".to_string(),
                universidade_id: uni.id,
                unidade_id: unidade.id,
            })
            .await
            .unwrap();
        let turma = repo
            .create_turma(&TurmaCreate {
                nome: "DIR2024".to_string(),
                curso_id: curso.id,
                unidade_id: unidade.id,
                universidade_id: uni.id,
            })
            .await
            .unwrap();

        assert_eq!(repo.get_turma(turma.id).await.unwrap(), Some(turma));
        assert_eq!(repo.list_cursos().await.unwrap(), vec![curso]);
        assert_eq!(
            repo.find_universidade_by_nome("UFX").await.unwrap().map(|u| u.id),
            Some(uni.id)
        );
    }

    #[tokio::test]
    async fn test_update_keeps_absent_fields() {
        let repo = repo().await;
        let uni = repo
            .create_universidade(&UniversidadeCreate {
                nome: "UFX".to_string(),
            })
            .await
            .unwrap();
        let unidade = repo
            .create_unidade(&UnidadeCreate {
                nome: "Campus".to_string(),
                universidade_id: uni.id,
            })
            .await
            .unwrap();

        let updated = repo
            .update_unidade(
                unidade.id,
                &UnidadeUpdate {
                    nome: Some("Campus Sul".to_string()),
                    universidade_id: None,
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.nome, "Campus Sul");
        assert_eq!(updated.universidade_id, uni.id);
        assert!(repo
            .update_unidade(999, &UnidadeUpdate::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_units_are_deleted_with_university() {
        let repo = repo().await;
        let uni = repo
            .create_universidade(&UniversidadeCreate {
                nome: "UFX".to_string(),
            })
            .await
            .unwrap();
        repo.create_unidade(&UnidadeCreate {
            nome: "Campus".to_string(),
            universidade_id: uni.id,
        })
        .await
        .unwrap();

        assert!(repo.delete_universidade(uni.id).await.unwrap());
        assert!(repo.list_unidades().await.unwrap().is_empty());
        assert!(!repo.delete_universidade(uni.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_parent_is_rejected() {
        let repo = repo().await;
        let result = repo
            .create_curso(&CursoCreate {
                nome: "Física".to_string(),
                universidade_id: 41,
                unidade_id: 42,
            })
            .await;

        let err = result.unwrap_err();
        let db_err = err.as_database_error().unwrap();
        assert!(db_err.is_foreign_key_violation());
    }
}
