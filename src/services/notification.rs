//! Notification delivery.
//!
//! Services hold an injected [`Notifier`]; there is no global mail client.

use std::sync::Arc;

use apalis::prelude::Storage;
use apalis_sql::postgres::PostgresStorage;
use async_trait::async_trait;

use crate::errors::NotificationError;
use crate::infra::Mailer;
use crate::jobs::EmailJob;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, email: EmailJob) -> Result<(), NotificationError>;
}

/// Durable outbox: emails are written to the job queue and delivered by
/// the worker, which retries failures.
#[derive(Clone)]
pub struct QueuedNotifier {
    storage: PostgresStorage<EmailJob>,
}

impl QueuedNotifier {
    pub fn new(storage: PostgresStorage<EmailJob>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Notifier for QueuedNotifier {
    async fn send(&self, email: EmailJob) -> Result<(), NotificationError> {
        let to = email.to.clone();
        let mut storage = self.storage.clone();
        storage
            .push(email)
            .await
            .map_err(|e| NotificationError::Queue(e.to_string()))?;

        tracing::debug!(to = %to, "Email job enqueued");
        Ok(())
    }
}

/// Sends inline through the mail transport.
#[derive(Clone)]
pub struct DirectNotifier {
    mailer: Arc<Mailer>,
}

impl DirectNotifier {
    pub fn new(mailer: Arc<Mailer>) -> Self {
        Self { mailer }
    }
}

#[async_trait]
impl Notifier for DirectNotifier {
    async fn send(&self, email: EmailJob) -> Result<(), NotificationError> {
        self.mailer.send(&email).await
    }
}

/// Send and swallow the failure.
///
/// Notifications never fail the operation that triggered them; a failure
/// is logged with `context`.
pub async fn notify(notifier: &dyn Notifier, email: EmailJob, context: &'static str) {
    let to = email.to.clone();
    if let Err(e) = notifier.send(email).await {
        tracing::error!(to = %to, context, error = %e, "Notification failed");
    }
}
