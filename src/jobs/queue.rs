//! Postgres-backed job queue.

use apalis_sql::postgres::PostgresStorage;
use apalis_sql::sqlx::postgres::PgPoolOptions;

use super::EmailJob;
use crate::errors::{AppError, AppResult};

const QUEUE_MAX_CONNECTIONS: u32 = 5;

/// Open the email queue, creating the apalis tables on first use.
pub async fn email_storage(database_url: &str) -> AppResult<PostgresStorage<EmailJob>> {
    let pool = PgPoolOptions::new()
        .max_connections(QUEUE_MAX_CONNECTIONS)
        .connect(database_url)
        .await
        .map_err(|e| AppError::internal(format!("Failed to connect job queue: {}", e)))?;

    PostgresStorage::setup(&pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to setup job storage: {}", e)))?;

    Ok(PostgresStorage::new(pool))
}
