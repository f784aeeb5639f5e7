//! Email background job.
//!
//! Emails are queued as [`EmailJob`]s and delivered by the `jobs work`
//! process through the shared [`Mailer`]. A failed delivery returns an
//! error so the worker's retry policy picks it up again.

use apalis::prelude::Data;
use serde::{Deserialize, Serialize};

use crate::errors::NotificationError;
use crate::infra::Mailer;

/// Email job payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailJob {
    /// Recipient email address
    pub to: String,
    /// Email subject line
    pub subject: String,
    /// Plain-text body
    pub text: String,
    /// Optional HTML alternative
    #[serde(default)]
    pub html: Option<String>,
}

impl EmailJob {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            text: text.into(),
            html: None,
        }
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }
}

/// Email job handler - processes email sending jobs
pub async fn email_job_handler(job: EmailJob, mailer: Data<Mailer>) -> Result<(), NotificationError> {
    tracing::info!(to = %job.to, subject = %job.subject, "Processing email job");

    if let Err(e) = mailer.send(&job).await {
        tracing::warn!(to = %job.to, error = %e, "Email delivery failed, will retry");
        return Err(e);
    }

    tracing::info!(to = %job.to, "Email processed successfully");
    Ok(())
}
