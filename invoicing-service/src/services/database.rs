//! Database service for invoicing-service.

use crate::models::{
    generate_invoice_no, invoice_total, Client, CreateInvoice, Invoice, InvoiceItem,
    InvoiceWithItems, PricedLine, Product,
};
use crate::services::error::InvoiceError;
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::migrations::{self, MigrationOutcome};
use service_core::error::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, instrument};

const MEMORY_URL: &str = "sqlite::memory:";

/// Connection pool settings.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    /// `None` keeps idle connections open indefinitely.
    pub idle_timeout: Option<Duration>,
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        DbConfig {
            database_url: database_url.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
        }
    }

    /// Private in-memory database, migrated on connect.
    ///
    /// Every new connection to `:memory:` opens an empty database, so the
    /// pool holds exactly one connection and never recycles it.
    pub fn in_memory() -> Self {
        DbConfig {
            database_url: MEMORY_URL.to_string(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: None,
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    fn is_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the pool and, if configured, apply the schema migration.
    #[instrument(skip(config), fields(service = "invoicing-service"))]
    pub async fn new(config: DbConfig) -> Result<Self, AppError> {
        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Connecting to SQLite"
        );

        let mut options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid DATABASE_URL: {}", e)))?
            .foreign_keys(true)
            .create_if_missing(true);
        if !config.is_memory() {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout);
        if config.is_memory() {
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("SQLite connection pool established");

        let db = Self { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    pub async fn run_migrations(&self) -> Result<MigrationOutcome, AppError> {
        info!("Running database migrations");
        let outcome = migrations::upgrade(&self.pool).await?;
        info!(outcome = ?outcome, "Database migrations completed");
        Ok(outcome)
    }

    // -------------------------------------------------------------------------
    // Catalog Operations
    // -------------------------------------------------------------------------

    /// List seeded products ordered by id.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, InvoiceError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_products"])
            .start_timer();

        let products =
            sqlx::query_as::<_, Product>("SELECT id, name, price FROM products ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        timer.observe_duration();

        Ok(products)
    }

    /// List seeded clients ordered by id.
    #[instrument(skip(self))]
    pub async fn list_clients(&self) -> Result<Vec<Client>, InvoiceError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_clients"])
            .start_timer();

        let clients = sqlx::query_as::<_, Client>(
            "SELECT id, name, address, registration_no FROM clients ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        timer.observe_duration();

        Ok(clients)
    }

    // -------------------------------------------------------------------------
    // Invoice Operations
    // -------------------------------------------------------------------------

    /// Create an invoice and its items in one transaction.
    ///
    /// Every referenced row is resolved and every total computed before the
    /// first write. Any error drops the transaction, which rolls it back.
    #[instrument(skip(self, input), fields(client_id = input.client_id, items = input.items.len()))]
    pub async fn create_invoice(
        &self,
        input: &CreateInvoice,
    ) -> Result<InvoiceWithItems, InvoiceError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_invoice"])
            .start_timer();

        let mut tx = self.pool.begin().await?;

        let client = sqlx::query("SELECT id FROM clients WHERE id = ?")
            .bind(input.client_id)
            .fetch_optional(&mut *tx)
            .await?;
        if client.is_none() {
            return Err(InvoiceError::ClientNotFound);
        }

        let invoice_no = match input.invoice_no.as_deref().filter(|no| !no.is_empty()) {
            Some(no) => no.to_string(),
            None => {
                let existing: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM invoices")
                    .fetch_one(&mut *tx)
                    .await?;
                generate_invoice_no(existing)
            }
        };

        let mut lines = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let product = sqlx::query_as::<_, Product>(
                "SELECT id, name, price FROM products WHERE id = ?",
            )
            .bind(item.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(InvoiceError::ProductNotFound(item.product_id))?;

            lines.push(PricedLine::new(
                product.id,
                product.name,
                item.quantity,
                product.price,
            ));
        }

        let total = invoice_total(&lines, input.tax);

        let invoice_id = sqlx::query(
            r#"
            INSERT INTO invoices (invoice_no, issue_date, due_date, client_id, address, tax, total)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&invoice_no)
        .bind(&input.issue_date)
        .bind(&input.due_date)
        .bind(input.client_id)
        .bind(&input.address)
        .bind(input.tax)
        .bind(total)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let item_id = sqlx::query(
                r#"
                INSERT INTO invoice_items (invoice_id, product_id, quantity, unit_price, line_total)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(invoice_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.line_total)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

            items.push(InvoiceItem {
                id: item_id,
                product_id: line.product_id,
                product_name: line.product_name,
                quantity: line.quantity,
                unit_price: line.unit_price,
                line_total: line.line_total,
            });
        }

        tx.commit().await?;

        timer.observe_duration();

        info!(invoice_id, invoice_no = %invoice_no, total, "Invoice created");

        Ok(InvoiceWithItems {
            invoice: Invoice {
                id: invoice_id,
                invoice_no,
                issue_date: input.issue_date.clone(),
                due_date: input.due_date.clone(),
                client_id: input.client_id,
                address: input.address.clone(),
                tax: input.tax,
                total,
            },
            items,
        })
    }

    /// List invoice headers, newest first.
    #[instrument(skip(self))]
    pub async fn list_invoices(&self) -> Result<Vec<Invoice>, InvoiceError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_invoices"])
            .start_timer();

        let invoices = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT id, invoice_no, issue_date, due_date, client_id, address, tax, total
            FROM invoices
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        timer.observe_duration();

        Ok(invoices)
    }

    /// Get an invoice with its items.
    #[instrument(skip(self))]
    pub async fn get_invoice(&self, invoice_id: i64) -> Result<InvoiceWithItems, InvoiceError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_invoice"])
            .start_timer();

        let mut tx = self.pool.begin().await?;

        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT id, invoice_no, issue_date, due_date, client_id, address, tax, total
            FROM invoices
            WHERE id = ?
            "#,
        )
        .bind(invoice_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(InvoiceError::InvoiceNotFound)?;

        // Names come from the live product row; prices stay as snapshotted.
        let items = sqlx::query_as::<_, InvoiceItem>(
            r#"
            SELECT ii.id, ii.product_id, p.name AS product_name, ii.quantity,
                ii.unit_price, ii.line_total
            FROM invoice_items ii
            JOIN products p ON ii.product_id = p.id
            WHERE ii.invoice_id = ?
            ORDER BY ii.id
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        timer.observe_duration();

        Ok(InvoiceWithItems { invoice, items })
    }

    /// Delete an invoice and the items it owns.
    #[instrument(skip(self))]
    pub async fn delete_invoice(&self, invoice_id: i64) -> Result<(), InvoiceError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_invoice"])
            .start_timer();

        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query("SELECT id FROM invoices WHERE id = ?")
            .bind(invoice_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(InvoiceError::InvoiceNotFound);
        }

        let removed_items = sqlx::query("DELETE FROM invoice_items WHERE invoice_id = ?")
            .bind(invoice_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM invoices WHERE id = ?")
            .bind(invoice_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        timer.observe_duration();

        debug!(removed_items, "Invoice items removed");
        info!(invoice_id, "Invoice deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateInvoiceItem;

    async fn memory_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn request(items: Vec<CreateInvoiceItem>) -> CreateInvoice {
        CreateInvoice {
            invoice_no: None,
            issue_date: "2025-01-01".to_string(),
            due_date: "2025-01-31".to_string(),
            client_id: 1,
            address: None,
            tax: 0.0,
            items,
        }
    }

    #[test]
    fn config_builder_overrides_defaults() {
        let config = DbConfig::new("sqlite://invoices.db")
            .max_connections(10)
            .min_connections(2)
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.run_migrations);
        assert!(!config.is_memory());
        assert!(DbConfig::in_memory().is_memory());
    }

    #[tokio::test]
    async fn in_memory_database_is_migrated() {
        let db = memory_db().await;
        db.health_check().await.unwrap();

        assert_eq!(db.list_products().await.unwrap().len(), 3);
        assert_eq!(db.list_clients().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_invoice_no_is_generated() {
        let db = memory_db().await;
        let mut input = request(vec![CreateInvoiceItem {
            product_id: 1,
            quantity: 1,
        }]);
        input.invoice_no = Some(String::new());

        let created = db.create_invoice(&input).await.unwrap();
        assert_eq!(created.invoice.invoice_no, "INV-00001");
    }

    #[tokio::test]
    async fn unit_price_is_a_snapshot() {
        let db = memory_db().await;
        let created = db
            .create_invoice(&request(vec![CreateInvoiceItem {
                product_id: 2,
                quantity: 2,
            }]))
            .await
            .unwrap();

        sqlx::query("UPDATE products SET price = 99.0, name = 'Widget B v2' WHERE id = 2")
            .execute(db.pool())
            .await
            .unwrap();

        let fetched = db.get_invoice(created.invoice.id).await.unwrap();
        assert_eq!(fetched.invoice.total, 31.0);
        assert_eq!(fetched.items[0].unit_price, 15.5);
        assert_eq!(fetched.items[0].line_total, 31.0);
        assert_eq!(fetched.items[0].product_name, "Widget B v2");
    }

    #[tokio::test]
    async fn failed_create_leaves_no_rows() {
        let db = memory_db().await;
        let err = db
            .create_invoice(&request(vec![
                CreateInvoiceItem {
                    product_id: 1,
                    quantity: 1,
                },
                CreateInvoiceItem {
                    product_id: 404,
                    quantity: 1,
                },
            ]))
            .await
            .unwrap_err();

        assert!(matches!(err, InvoiceError::ProductNotFound(404)));
        assert!(db.list_invoices().await.unwrap().is_empty());
        let items: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM invoice_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(items, 0);
    }

    #[tokio::test]
    async fn delete_unknown_invoice_is_not_found() {
        let db = memory_db().await;
        let err = db.delete_invoice(7).await.unwrap_err();
        assert!(matches!(err, InvoiceError::InvoiceNotFound));
    }
}
