//! Postgres connection pool and schema migrations.
//!
//! Migrations live in `migrations/` at the crate root and are embedded at compile time.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Opens a connection pool and applies any pending migrations.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    log::info!(
        "connecting to database (max_connections = {})",
        max_connections
    );

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(database_url)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    log::info!("running database migrations");
    sqlx::migrate!("./migrations").run(pool).await.map_err(|e| {
        log::error!("migration failed: {}", e);
        e
    })
}
