//! Invoicing migration CLI.
//!
//! Applies, reverts, or reports the invoice schema against a SQLite database.

use clap::{Parser, Subcommand};
use invoicing_service::services::migrations;
use invoicing_service::services::{Database, DbConfig, MigrationOutcome};
use service_core::error::AppError;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "invoicing-migrate")]
#[command(about = "Schema migrations for the invoicing database")]
#[command(version)]
struct Cli {
    /// Database connection URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://invoices.db")]
    database_url: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create tables and seed the catalog
    Upgrade,

    /// Drop the invoice tables
    Downgrade,

    /// Show applied migrations
    Status,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let db = Database::new(DbConfig::new(cli.database_url).run_migrations(false)).await?;

    match cli.command {
        Commands::Upgrade => match migrations::upgrade(db.pool()).await? {
            MigrationOutcome::AlreadyApplied => {
                println!("{} already applied", migrations::MIGRATION_NAME)
            }
            _ => println!("Applied {}", migrations::MIGRATION_NAME),
        },
        Commands::Downgrade => {
            migrations::downgrade(db.pool()).await?;
            println!("Reverted {}", migrations::MIGRATION_NAME);
        }
        Commands::Status => {
            let applied = migrations::status(db.pool()).await?;
            if applied.is_empty() {
                println!("No migrations applied");
            }
            for migration in applied {
                let at = migration
                    .applied_at
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{:>3}  {}  {}", migration.id, migration.name, at);
            }
        }
    }

    Ok(())
}
