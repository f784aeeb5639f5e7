//! Jobs command - Email queue management.
//!
//! - `work`: deliver queued emails, retrying failures
//! - `list`: job counts by status
//! - `clear`: remove failed jobs

use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

use crate::cli::args::{JobsAction, JobsArgs};
use crate::config::{Config, EMAIL_JOB_MAX_RETRIES, JOB_WORKER_EMAIL};
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, Mailer};

pub async fn execute(args: JobsArgs, config: Config) -> AppResult<()> {
    match args.action {
        JobsAction::Work => run_worker(&config).await,
        JobsAction::List => list_jobs(&config).await,
        JobsAction::Clear => clear_failed_jobs(&config).await,
    }
}

/// Run the email worker until Ctrl+C.
async fn run_worker(config: &Config) -> AppResult<()> {
    use apalis::layers::retry::RetryPolicy;
    use apalis::prelude::*;

    use crate::jobs::{email_job_handler, email_storage};

    let storage = email_storage(&config.database_url).await?;
    let mailer = Mailer::new(config.mail.clone());

    if config.mail.mailjet_credentials().is_none() {
        tracing::warn!("Mailjet credentials missing; emails will only be logged");
    }

    let worker = WorkerBuilder::new(JOB_WORKER_EMAIL)
        .data(mailer)
        .retry(RetryPolicy::retries(EMAIL_JOB_MAX_RETRIES))
        .backend(storage)
        .build_fn(email_job_handler);

    tracing::info!(worker = JOB_WORKER_EMAIL, "Job worker started. Press Ctrl+C to stop.");

    tokio::select! {
        result = Monitor::new().register(worker).run() => {
            if let Err(e) = result {
                tracing::error!("Worker error: {}", e);
                return Err(AppError::internal(format!("Worker failed: {}", e)));
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping worker...");
        }
    }

    tracing::info!("Job worker stopped.");
    Ok(())
}

/// Queue connection, or `None` when the worker has never created the tables
async fn queue_connection(config: &Config) -> AppResult<Option<DatabaseConnection>> {
    let db = Database::connect_without_migrations(config).await?.get_connection();

    let row = db
        .query_one(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT EXISTS(SELECT 1 FROM information_schema.schemata WHERE schema_name = 'apalis') as exists",
        ))
        .await?;

    let exists = row
        .and_then(|r| r.try_get::<bool>("", "exists").ok())
        .unwrap_or(false);

    Ok(exists.then_some(db))
}

async fn list_jobs(config: &Config) -> AppResult<()> {
    let Some(db) = queue_connection(config).await? else {
        println!("Job queue not initialized. Run 'jobs work' or start the server first.");
        return Ok(());
    };

    let rows = db
        .query_all(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT status::text as status, COUNT(*)::bigint as count FROM apalis.jobs GROUP BY status ORDER BY status",
        ))
        .await?;

    println!("\n=== Email Queue ===");
    for row in rows {
        if let (Ok(status), Ok(count)) = (
            row.try_get::<String>("", "status"),
            row.try_get::<i64>("", "count"),
        ) {
            println!("{:<9} {}", format!("{}:", status), count);
        }
    }
    println!("===================\n");

    Ok(())
}

async fn clear_failed_jobs(config: &Config) -> AppResult<()> {
    let Some(db) = queue_connection(config).await? else {
        println!("Job queue not initialized. Nothing to clear.");
        return Ok(());
    };

    let result = db
        .execute(Statement::from_string(
            DatabaseBackend::Postgres,
            "DELETE FROM apalis.jobs WHERE status IN ('Failed', 'Killed')",
        ))
        .await?;

    println!("Cleared {} failed job(s) from the queue.", result.rows_affected());
    Ok(())
}
