//! Serve command - Starts the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::{Config, EmailDelivery};
use crate::errors::{AppError, AppResult};
use crate::infra::{Cache, Database, Mailer, Persistence};
use crate::jobs::email_storage;
use crate::services::{DirectNotifier, Notifier, QueuedNotifier, Services};

pub async fn execute(args: ServeArgs, mut config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    if let Some(host) = args.host {
        config.server_host = host;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }

    let db = Database::connect(&config).await?;
    let cache = Cache::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Redis connection failed: {}", e)))?;

    let notifier = build_notifier(&config).await?;
    let persistence = Arc::new(Persistence::new(db.get_connection()));
    let services = Arc::new(Services::from_store(persistence, notifier, &config));

    let state = AppState::new(services)
        .with_database(Arc::new(db))
        .with_cache(Arc::new(cache));
    let app = create_router(state);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}

async fn build_notifier(config: &Config) -> AppResult<Arc<dyn Notifier>> {
    match config.mail.delivery {
        EmailDelivery::Queue => {
            let storage = email_storage(&config.database_url).await?;
            tracing::info!("Emails are queued for the job worker");
            Ok(Arc::new(QueuedNotifier::new(storage)))
        }
        EmailDelivery::Direct => {
            tracing::info!("Emails are sent inline");
            Ok(Arc::new(DirectNotifier::new(Arc::new(Mailer::new(
                config.mail.clone(),
            )))))
        }
    }
}
