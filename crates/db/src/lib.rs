//! Record store for jobs, models, and voices.
//!
//! The scheduler and any interactive caller talk to storage through the
//! [`store::RecordStore`] trait. Two implementations ship here:
//! [`pg::PgRecordStore`] (PostgreSQL via sqlx, the production store) and
//! [`mem::MemoryRecordStore`] (in-process maps, used by tests and
//! database-less development).

use sqlx::postgres::PgPoolOptions;

pub mod mem;
pub mod models;
pub mod pg;
pub mod repositories;
pub mod store;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Verify the database connection with a trivial roundtrip.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from the crate's `migrations/` directory.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
