//! Database connection pool and schema migrations.

use std::time::Duration;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::settings;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Open a connection pool for the configured database.
pub async fn connect(database: &settings::Database) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(database.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&database.url)
        .await
}

/// Apply pending migrations from `packages/api/migrations`.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}
