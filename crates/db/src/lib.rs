//! Persistence layer for the relay event bus.
//!
//! Pool construction, embedded migrations, row models, and repository types.
//! All repositories are stateless structs with associated functions taking a
//! `&DbPool`, so callers decide transaction boundaries.

pub mod models;
pub mod repositories;

/// The shared connection pool type used across the workspace.
pub type DbPool = sqlx::SqlitePool;

/// Create a connection pool from a sqlx connection string.
///
/// Use `sqlite://<path>?mode=rwc` to create the database file on first run.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
}

/// Apply all embedded migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Cheap connectivity probe used by the health endpoint.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
