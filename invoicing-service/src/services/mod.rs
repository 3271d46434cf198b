//! Services module for invoicing-service.

pub mod database;
pub mod error;
pub mod metrics;
pub mod migrations;

pub use database::{Database, DbConfig};
pub use error::InvoiceError;
pub use metrics::{get_metrics, init_metrics};
pub use migrations::{AppliedMigration, MigrationOutcome, MIGRATION_NAME};
