//! Database bootstrap: default institution, first administrator, waste types

use anyhow::{bail, Context};
use recicla_api::auth::{hash_password, NewUser, UserRepository};
use recicla_api::institutional::{
    CursoCreate, InstitutionalRepository, TurmaCreate, UnidadeCreate, UniversidadeCreate,
};
use recicla_api::recycling::{RecyclingRepository, TipoResiduoCreate};
use recicla_core::Perfil;
use sqlx::SqlitePool;

pub const DEFAULT_UNIVERSIDADE: &str = "Universidade Padrão";
pub const DEFAULT_UNIDADE: &str = "Campus Principal";
pub const DEFAULT_CURSO: &str = "Administração";
pub const DEFAULT_TURMA: &str = "ADM2024";

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@serrecicla.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

pub const TIPOS_RESIDUO: [&str; 6] = ["Papel", "Plástico", "Metal", "Vidro", "Orgânico", "Eletrônico"];

/// What `seed_database` did
#[derive(Debug, Default, PartialEq)]
pub struct SeedReport {
    pub admin_created: bool,
    pub tipos_residuo_created: usize,
}

/// Seed a freshly migrated database
///
/// Skipped entirely once the default administrator exists, so running it
/// twice is harmless. Each default row is looked up by name before it is
/// inserted, so a run that failed part way can simply be repeated.
pub async fn seed_database(pool: &SqlitePool) -> anyhow::Result<SeedReport> {
    let users = UserRepository::new(pool.clone());
    if users.get_by_username(DEFAULT_ADMIN_USERNAME).await?.is_some() {
        tracing::info!("Administrator already present, skipping seed");
        return Ok(SeedReport::default());
    }

    let institutional = InstitutionalRepository::new(pool.clone());
    let universidade = match institutional
        .find_universidade_by_nome(DEFAULT_UNIVERSIDADE)
        .await?
    {
        Some(existing) => existing,
        None => {
            institutional
                .create_universidade(&UniversidadeCreate {
                    nome: DEFAULT_UNIVERSIDADE.to_string(),
                })
                .await?
        }
    };

    let unidade = match institutional
        .find_unidade_by_nome(universidade.id, DEFAULT_UNIDADE)
        .await?
    {
        Some(existing) => existing,
        None => {
            institutional
                .create_unidade(&UnidadeCreate {
                    nome: DEFAULT_UNIDADE.to_string(),
                    universidade_id: universidade.id,
                })
                .await?
        }
    };

    let curso = match institutional
        .find_curso_by_nome(unidade.id, DEFAULT_CURSO)
        .await?
    {
        Some(existing) => existing,
        None => {
            institutional
                .create_curso(&CursoCreate {
                    nome: DEFAULT_CURSO.to_string(),
                    universidade_id: universidade.id,
                    unidade_id: unidade.id,
                })
                .await?
        }
    };

    if institutional
        .find_turma_by_nome(curso.id, DEFAULT_TURMA)
        .await?
        .is_none()
    {
        institutional
            .create_turma(&TurmaCreate {
                nome: DEFAULT_TURMA.to_string(),
                curso_id: curso.id,
                unidade_id: unidade.id,
                universidade_id: universidade.id,
            })
            .await?;
    }

    users
        .create(NewUser {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            email: DEFAULT_ADMIN_EMAIL.to_string(),
            first_name: Some("Administrador".to_string()),
            last_name: Some("Sistema".to_string()),
            hashed_password: hash_password(DEFAULT_ADMIN_PASSWORD)?,
            perfil: Perfil::AdminUni,
            is_superuser: true,
            universidade_id: Some(universidade.id),
            unidade_id: Some(unidade.id),
            turma_id: None,
        })
        .await
        .context("Failed to create the default administrator")?;
    tracing::warn!(
        username = DEFAULT_ADMIN_USERNAME,
        "Default administrator created; change its password"
    );

    let recycling = RecyclingRepository::new(pool.clone());
    let existing: Vec<String> = recycling
        .list_tipos_residuo()
        .await?
        .into_iter()
        .map(|t| t.nome)
        .collect();

    let mut tipos_residuo_created = 0;
    for nome in TIPOS_RESIDUO {
        if existing.iter().any(|e| e == nome) {
            continue;
        }
        recycling
            .create_tipo_residuo(&TipoResiduoCreate {
                nome: nome.to_string(),
            })
            .await?;
        tipos_residuo_created += 1;
    }

    Ok(SeedReport {
        admin_created: true,
        tipos_residuo_created,
    })
}

/// Create an `ADMIN_UNI` superuser with the given credentials
pub async fn create_admin(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<i64> {
    if password.len() < 6 {
        bail!("Password must be at least 6 characters");
    }

    let users = UserRepository::new(pool.clone());
    if users.get_by_username(username).await?.is_some() {
        bail!("Username already registered");
    }
    if users.get_by_email(email).await?.is_some() {
        bail!("Email already registered");
    }

    let user = users
        .create(NewUser {
            username: username.to_string(),
            email: email.to_string(),
            first_name: None,
            last_name: None,
            hashed_password: hash_password(password)?,
            perfil: Perfil::AdminUni,
            is_superuser: true,
            universidade_id: None,
            unidade_id: None,
            turma_id: None,
        })
        .await?;

    Ok(user.id)
}
