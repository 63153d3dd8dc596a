//! Institutional services: payload validation and not-found mapping

use super::models::*;
use super::repository::InstitutionalRepository;
use crate::error::AppError;
use sqlx::SqlitePool;
use validator::Validate;

pub struct InstitutionalService {
    repository: InstitutionalRepository,
}

impl InstitutionalService {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self {
            repository: InstitutionalRepository::new(db_pool),
        }
    }

    pub async fn list_universidades(&self) -> Result<Vec<Universidade>, AppError> {
        Ok(self.repository.list_universidades().await?)
    }

    pub async fn get_universidade(&self, id: i64) -> Result<Universidade, AppError> {
        self.repository
            .get_universidade(id)
            .await?
            .ok_or_else(|| not_found("Universidade não encontrada"))
    }

    pub async fn create_universidade(
        &self,
        data: UniversidadeCreate,
    ) -> Result<Universidade, AppError> {
        data.validate()?;
        Ok(self.repository.create_universidade(&data).await?)
    }

    pub async fn update_universidade(
        &self,
        id: i64,
        data: UniversidadeUpdate,
    ) -> Result<Universidade, AppError> {
        data.validate()?;
        self.repository
            .update_universidade(id, &data)
            .await?
            .ok_or_else(|| not_found("Universidade não encontrada"))
    }

    pub async fn delete_universidade(&self, id: i64) -> Result<(), AppError> {
        found_or(
            self.repository.delete_universidade(id).await?,
            "Universidade não encontrada",
        )
    }

    pub async fn list_unidades(&self) -> Result<Vec<Unidade>, AppError> {
        Ok(self.repository.list_unidades().await?)
    }

    pub async fn get_unidade(&self, id: i64) -> Result<Unidade, AppError> {
        self.repository
            .get_unidade(id)
            .await?
            .ok_or_else(|| not_found("Unidade não encontrada"))
    }

    pub async fn create_unidade(&self, data: UnidadeCreate) -> Result<Unidade, AppError> {
        data.validate()?;
        Ok(self.repository.create_unidade(&data).await?)
    }

    pub async fn update_unidade(&self, id: i64, data: UnidadeUpdate) -> Result<Unidade, AppError> {
        data.validate()?;
        self.repository
            .update_unidade(id, &data)
            .await?
            .ok_or_else(|| not_found("Unidade não encontrada"))
    }

    pub async fn delete_unidade(&self, id: i64) -> Result<(), AppError> {
        found_or(
            self.repository.delete_unidade(id).await?,
            "Unidade não encontrada",
        )
    }

    pub async fn list_cursos(&self) -> Result<Vec<Curso>, AppError> {
        Ok(self.repository.list_cursos().await?)
    }

    pub async fn get_curso(&self, id: i64) -> Result<Curso, AppError> {
        self.repository
            .get_curso(id)
            .await?
            .ok_or_else(|| not_found("Curso não encontrado"))
    }

    pub async fn create_curso(&self, data: CursoCreate) -> Result<Curso, AppError> {
        data.validate()?;
        Ok(self.repository.create_curso(&data).await?)
    }

    pub async fn update_curso(&self, id: i64, data: CursoUpdate) -> Result<Curso, AppError> {
        data.validate()?;
        self.repository
            .update_curso(id, &data)
            .await?
            .ok_or_else(|| not_found("Curso não encontrado"))
    }

    pub async fn delete_curso(&self, id: i64) -> Result<(), AppError> {
        found_or(self.repository.delete_curso(id).await?, "Curso não encontrado")
    }

    pub async fn list_turmas(&self) -> Result<Vec<Turma>, AppError> {
        Ok(self.repository.list_turmas().await?)
    }

    pub async fn get_turma(&self, id: i64) -> Result<Turma, AppError> {
        self.repository
            .get_turma(id)
            .await?
            .ok_or_else(|| not_found("Turma não encontrada"))
    }

    pub async fn create_turma(&self, data: TurmaCreate) -> Result<Turma, AppError> {
        data.validate()?;
        Ok(self.repository.create_turma(&data).await?)
    }

    pub async fn update_turma(&self, id: i64, data: TurmaUpdate) -> Result<Turma, AppError> {
        data.validate()?;
        self.repository
            .update_turma(id, &data)
            .await?
            .ok_or_else(|| not_found("Turma não encontrada"))
    }

    pub async fn delete_turma(&self, id: i64) -> Result<(), AppError> {
        found_or(self.repository.delete_turma(id).await?, "Turma não encontrada")
    }
}

fn not_found(detail: &str) -> AppError {
    AppError::NotFound(detail.to_string())
}

fn found_or(found: bool, detail: &str) -> Result<(), AppError> {
    if found {
        Ok(())
    } else {
        Err(not_found(detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use axum::http::StatusCode;

    async fn service() -> InstitutionalService {
        let pool = db::connect_in_memory().await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        InstitutionalService::new(pool)
    }

    #[tokio::test]
    async fn test_missing_records_are_not_found() {
        let service = service().await;

        let err = service.get_universidade(1).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Universidade não encontrada");

        let err = service.delete_turma(1).await.unwrap_err();
        assert_eq!(err.to_string(), "Turma não encontrada");

        let err = service
            .update_curso(1, CursoUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let service = service().await;
        let err = service
            .create_universidade(UniversidadeCreate {
                nome: String::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_dangling_reference_is_bad_request() {
        let service = service().await;
        let err = service
            .create_unidade(UnidadeCreate {
                nome: "Campus".to_string(),
                universidade_id: 77,
            })
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_university_crud() {
        let service = service().await;
        let uni = service
            .create_universidade(UniversidadeCreate {
                nome: "UFX".to_string(),
            })
            .await
            .unwrap();

        let renamed = service
            .update_universidade(
                uni.id,
                UniversidadeUpdate {
                    nome: Some("UFY".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.nome, "UFY");
        assert_eq!(service.list_universidades().await.unwrap().len(), 1);

        service.delete_universidade(uni.id).await.unwrap();
        assert!(service.list_universidades().await.unwrap().is_empty());
    }
}
