//! Storage layer for the muster campaign tracker.
//!
//! Repositories are zero-sized structs providing async methods that take a
//! `&SqlitePool` as their first argument. Every operation that mutates a
//! pool entry runs inside a single transaction so concurrent events on the
//! same asset serialize correctly. Reads take no locks.

pub mod config;
pub mod error;
pub mod migrations;
pub mod models;
pub mod report;
pub mod repositories;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub use error::{StoreError, StoreResult};

/// Open a connection pool and bring the schema up to date.
///
/// Foreign key enforcement is switched on for every connection; the schema
/// relies on cascades for mission and event deletion.
pub async fn connect(database_url: &str) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    migrations::run_migrations(&pool).await?;
    Ok(pool)
}

/// Cheap readiness probe for the surrounding service layer.
pub async fn health_check(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
