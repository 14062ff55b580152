//! Database layer for the ledger.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the ledger schema
//! - [`SeaOrmStore`], the Postgres implementation of the core's store traits
//! - Database migrations

#[allow(missing_docs)]
pub mod entities;
pub mod mapping;
pub mod migration;
pub mod store;

pub use store::{SeaOrmStore, SeaOrmTx};

use std::time::Duration;

use ledgerline_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool sized from `config`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .sqlx_logging(false);
    tracing::debug!(max_connections = config.max_connections, "connecting to database");
    Database::connect(options).await
}
