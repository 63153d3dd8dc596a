//! Ser Recicla admin CLI
//!
//! Usage:
//!   recicla init-db
//!   recicla create-admin --username <name> --email <email> --password <password>

mod seed;

use anyhow::Context;
use clap::{Parser, Subcommand};
use recicla_api::db;
use recicla_core::AppConfig;

#[derive(Parser)]
#[command(name = "recicla")]
#[command(about = "Ser Recicla administration tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply migrations and seed the default institution, admin and waste types
    InitDb,
    /// Create an ADMIN_UNI superuser
    CreateAdmin {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recicla_cli=info,recicla_api=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;

    let pool = db::connect(&config.database)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.url))?;
    db::run_migrations(&pool)
        .await
        .context("Failed to apply database migrations")?;

    match cli.command {
        Commands::InitDb => {
            let report = seed::seed_database(&pool).await?;
            if report.admin_created {
                println!(
                    "Database initialized: admin user '{}' and {} waste types created",
                    seed::DEFAULT_ADMIN_USERNAME,
                    report.tipos_residuo_created
                );
            } else {
                println!("Database already initialized");
            }
        }
        Commands::CreateAdmin {
            username,
            email,
            password,
        } => {
            let id = seed::create_admin(&pool, &username, &email, &password).await?;
            println!("Administrator '{username}' created with id {id}");
        }
    }

    Ok(())
}
