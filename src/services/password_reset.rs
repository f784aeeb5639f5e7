//! Password-reset token lifecycle.
//!
//! `ABSENT -> ISSUED -> CONSUMED | EXPIRED -> ABSENT`. Issuing again
//! overwrites the previous grant. Expiry is checked lazily on use; nothing
//! sweeps stale grants.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::emails;
use super::notification::{notify, Notifier};
use crate::config::{PASSWORD_RESET_MESSAGE, RESET_PASSWORD_PATH, RESET_REQUESTED_MESSAGE};
use crate::domain::{normalize_email, Password, PasswordReset, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PasswordResetService: Send + Sync {
    /// Issue a grant for `email` and mail the link.
    ///
    /// Answers with the same confirmation whether or not the email is
    /// registered.
    async fn issue(&self, email: String) -> AppResult<String>;

    /// The user a live token belongs to, or `InvalidOrExpiredToken`.
    async fn validate(&self, token: String) -> AppResult<User>;

    /// Set a new password with a live token, burning the token.
    async fn consume(&self, token: String, new_password: String) -> AppResult<String>;
}

/// Reset-token service over any [`UnitOfWork`].
///
/// Each trait method delegates to an `_at` variant that takes the clock
/// reading explicitly, so expiry can be exercised at exact instants.
pub struct PasswordResetManager<U: UnitOfWork> {
    uow: Arc<U>,
    notifier: Arc<dyn Notifier>,
    base_url: String,
    ttl_seconds: i64,
}

impl<U: UnitOfWork> PasswordResetManager<U> {
    /// `base_url` is the public site root; a trailing slash is dropped.
    pub fn new(
        uow: Arc<U>,
        notifier: Arc<dyn Notifier>,
        base_url: impl Into<String>,
        ttl_seconds: i64,
    ) -> Self {
        Self {
            uow,
            notifier,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ttl_seconds,
        }
    }

    /// Link mailed to the user for `token`
    pub fn reset_link(&self, token: &str) -> String {
        format!("{}{}/{}", self.base_url, RESET_PASSWORD_PATH, token)
    }

    /// Issue a grant valid until `now + ttl` and mail the link.
    ///
    /// The email is trimmed and lower-cased before lookup. Unknown
    /// addresses get the same confirmation and nothing is stored. A
    /// failed notification is logged and leaves the stored grant usable.
    ///
    /// # Errors
    /// `Database` if the grant cannot be stored.
    pub async fn issue_at(&self, email: &str, now: DateTime<Utc>) -> AppResult<String> {
        let users = self.uow.users();
        let Some(user) = users.find_by_email(&normalize_email(email)).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(RESET_REQUESTED_MESSAGE.to_string());
        };

        let reset = PasswordReset::generate(now, self.ttl_seconds);
        let link = self.reset_link(&reset.token);
        users.set_reset_token(user.id, reset).await?;

        tracing::info!(user_id = %user.id, "Password reset token issued");
        notify(
            self.notifier.as_ref(),
            emails::password_reset(&user, &link, self.ttl_seconds),
            "password_reset",
        )
        .await;

        Ok(RESET_REQUESTED_MESSAGE.to_string())
    }

    /// The holder of `token` if its grant expires strictly after `now`.
    ///
    /// Read-only. An empty token is never valid.
    pub async fn validate_at(&self, token: &str, now: DateTime<Utc>) -> AppResult<User> {
        if token.is_empty() {
            return Err(AppError::InvalidOrExpiredToken);
        }

        self.uow
            .users()
            .find_by_reset_token(token, now)
            .await?
            .ok_or_else(|| {
                tracing::debug!("Rejected invalid or expired reset token");
                AppError::InvalidOrExpiredToken
            })
    }

    /// Replace the password and clear the grant in one conditional write.
    ///
    /// The new password is hashed first, so a too-short password fails
    /// with `Validation` and leaves the grant live. A second consume of the
    /// same token finds nothing to update and fails.
    ///
    /// # Errors
    /// `Validation`, `InvalidOrExpiredToken` or `Database`.
    pub async fn consume_at(
        &self,
        token: &str,
        new_password: &str,
        now: DateTime<Utc>,
    ) -> AppResult<String> {
        if token.is_empty() {
            return Err(AppError::InvalidOrExpiredToken);
        }

        let password_hash = Password::new(new_password)?.into_string();
        let user = self
            .uow
            .users()
            .consume_reset_token(token, password_hash, now)
            .await?
            .ok_or(AppError::InvalidOrExpiredToken)?;

        tracing::info!(user_id = %user.id, "Password reset completed");
        Ok(PASSWORD_RESET_MESSAGE.to_string())
    }
}

#[async_trait]
impl<U: UnitOfWork> PasswordResetService for PasswordResetManager<U> {
    async fn issue(&self, email: String) -> AppResult<String> {
        self.issue_at(&email, Utc::now()).await
    }

    async fn validate(&self, token: String) -> AppResult<User> {
        self.validate_at(&token, Utc::now()).await
    }

    async fn consume(&self, token: String, new_password: String) -> AppResult<String> {
        self.consume_at(&token, &new_password, Utc::now()).await
    }
}
