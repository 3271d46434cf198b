//! Schema initializer for the invoice tables.
//!
//! Applied migrations are recorded by name in `_migrations`; re-running
//! `upgrade` once the name is present is a no-op, so seed rows are inserted
//! exactly once. Each run executes in a single transaction.

use chrono::NaiveDateTime;
use serde::Serialize;
use service_core::error::AppError;
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};
use tracing::{info, instrument};

/// Name recorded in the bookkeeping table for this schema.
pub const MIGRATION_NAME: &str = "002_create_invoices_table";

const SEED_PRODUCTS: [(&str, f64); 3] = [
    ("Widget A", 10.0),
    ("Widget B", 15.5),
    ("Service C", 50.0),
];

const SEED_CLIENTS: [(&str, &str, &str); 2] = [
    ("Alice", "123 Main St", "REG-001"),
    ("Bob Inc", "456 Oak Ave", "REG-002"),
];

const CREATE_BOOKKEEPING: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
"#;

const CREATE_TABLES: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        price REAL NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS clients (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        address TEXT,
        registration_no TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS invoices (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        invoice_no TEXT NOT NULL,
        issue_date TEXT NOT NULL,
        due_date TEXT NOT NULL,
        client_id INTEGER NOT NULL,
        address TEXT,
        tax REAL NOT NULL DEFAULT 0.0,
        total REAL NOT NULL DEFAULT 0.0,
        FOREIGN KEY (client_id) REFERENCES clients(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS invoice_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        invoice_id INTEGER NOT NULL,
        product_id INTEGER NOT NULL,
        quantity INTEGER NOT NULL,
        unit_price REAL NOT NULL,
        line_total REAL NOT NULL,
        FOREIGN KEY (invoice_id) REFERENCES invoices(id),
        FOREIGN KEY (product_id) REFERENCES products(id)
    )
    "#,
];

// Owned tables first.
const DROP_TABLES: [&str; 4] = [
    "DROP TABLE IF EXISTS invoice_items",
    "DROP TABLE IF EXISTS invoices",
    "DROP TABLE IF EXISTS products",
    "DROP TABLE IF EXISTS clients",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    Applied,
    AlreadyApplied,
    Reverted,
}

/// Row of the bookkeeping table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AppliedMigration {
    pub id: i64,
    pub name: String,
    pub applied_at: Option<NaiveDateTime>,
}

/// Create the invoice schema and seed the catalog, unless already applied.
#[instrument(skip(pool))]
pub async fn upgrade(pool: &SqlitePool) -> Result<MigrationOutcome, AppError> {
    let mut tx = pool.begin().await.map_err(migration_error)?;
    let outcome = apply(&mut tx).await.map_err(migration_error)?;
    tx.commit().await.map_err(migration_error)?;

    match outcome {
        MigrationOutcome::AlreadyApplied => {
            info!(migration = MIGRATION_NAME, "Migration already applied, skipping")
        }
        _ => info!(migration = MIGRATION_NAME, "Migration applied"),
    }

    Ok(outcome)
}

/// Drop the invoice schema and forget that it was applied.
#[instrument(skip(pool))]
pub async fn downgrade(pool: &SqlitePool) -> Result<MigrationOutcome, AppError> {
    let mut tx = pool.begin().await.map_err(migration_error)?;
    revert(&mut tx).await.map_err(migration_error)?;
    tx.commit().await.map_err(migration_error)?;

    info!(migration = MIGRATION_NAME, "Migration reverted");

    Ok(MigrationOutcome::Reverted)
}

/// Applied migrations, oldest first.
pub async fn status(pool: &SqlitePool) -> Result<Vec<AppliedMigration>, AppError> {
    let exists: Option<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = '_migrations'",
    )
    .fetch_optional(pool)
    .await
    .map_err(migration_error)?;

    if exists.is_none() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, AppliedMigration>(
        "SELECT id, name, applied_at FROM _migrations ORDER BY id",
    )
    .fetch_all(pool)
    .await
    .map_err(migration_error)
}

async fn apply(tx: &mut Transaction<'_, Sqlite>) -> Result<MigrationOutcome, sqlx::Error> {
    sqlx::query(CREATE_BOOKKEEPING).execute(&mut **tx).await?;

    let applied = sqlx::query("SELECT 1 FROM _migrations WHERE name = ?")
        .bind(MIGRATION_NAME)
        .fetch_optional(&mut **tx)
        .await?;
    if applied.is_some() {
        return Ok(MigrationOutcome::AlreadyApplied);
    }

    for ddl in CREATE_TABLES {
        sqlx::query(ddl).execute(&mut **tx).await?;
    }

    for (name, price) in SEED_PRODUCTS {
        sqlx::query("INSERT INTO products (name, price) VALUES (?, ?)")
            .bind(name)
            .bind(price)
            .execute(&mut **tx)
            .await?;
    }

    for (name, address, registration_no) in SEED_CLIENTS {
        sqlx::query("INSERT INTO clients (name, address, registration_no) VALUES (?, ?, ?)")
            .bind(name)
            .bind(address)
            .bind(registration_no)
            .execute(&mut **tx)
            .await?;
    }

    sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
        .bind(MIGRATION_NAME)
        .execute(&mut **tx)
        .await?;

    Ok(MigrationOutcome::Applied)
}

async fn revert(tx: &mut Transaction<'_, Sqlite>) -> Result<(), sqlx::Error> {
    for ddl in DROP_TABLES {
        sqlx::query(ddl).execute(&mut **tx).await?;
    }

    sqlx::query(CREATE_BOOKKEEPING).execute(&mut **tx).await?;
    sqlx::query("DELETE FROM _migrations WHERE name = ?")
        .bind(MIGRATION_NAME)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

fn migration_error(e: sqlx::Error) -> AppError {
    AppError::DatabaseError(anyhow::anyhow!("Migration {} failed: {}", MIGRATION_NAME, e))
}
