use crate::error::DbResult;
use sqlx::{Any, Pool, any::AnyPoolOptions};

/// Create a database pool from a connection string
pub async fn create_pool(database_url: &str, max_connections: u32) -> DbResult<Pool<Any>> {
    let pool = AnyPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Run migrations on the database
///
/// The Any driver prepares one statement per query, so the migration file
/// is split on `;` and executed statement by statement.
pub async fn run_migrations(pool: &Pool<Any>) -> DbResult<()> {
    // Enable foreign keys for SQLite (no-op for other databases)
    let _ = sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await;

    for statement in include_str!("../migrations/001_initial.sql").split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}
