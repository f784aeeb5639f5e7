//! User service - profile self-service and administration.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{normalize_email, AdminUpdate, Password, ProfileUpdate, Transaction, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// `NotFound` if the account is gone
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// One page of accounts plus the total count
    async fn list_users(&self, params: PaginationParams) -> AppResult<(Vec<User>, u64)>;

    /// Apply a self-service edit; email changes must stay unique
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<User>;

    /// Remove the account, returning it as it was
    async fn delete_account(&self, id: Uuid) -> AppResult<User>;

    /// Set balance and account flags
    async fn admin_update(&self, id: Uuid, update: AdminUpdate) -> AppResult<User>;

    /// Ledger records for the account, newest first
    async fn transaction_history(&self, id: Uuid) -> AppResult<Vec<Transaction>>;
}

/// Profile and administrative account operations
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn list_users(&self, params: PaginationParams) -> AppResult<(Vec<User>, u64)> {
        self.uow.users().list(&params).await
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<User> {
        if update.is_empty() {
            return Err(AppError::validation("Invalid update"));
        }

        let users = self.uow.users();
        let mut user = users.find_by_id(id).await?.ok_or(AppError::NotFound)?;

        if let Some(email) = update.email.as_deref().map(normalize_email) {
            if email != user.email && users.find_by_email(&email).await?.is_some() {
                return Err(AppError::conflict("User with this email"));
            }
        }

        let password_hash = match update.password.as_deref() {
            Some(plain) => Some(Password::new(plain)?.into_string()),
            None => None,
        };

        user.apply_profile_update(update, password_hash);
        let user = users.update(&user).await?;

        tracing::info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    async fn delete_account(&self, id: Uuid) -> AppResult<User> {
        let user = self.uow.users().delete(id).await?;
        tracing::info!(user_id = %user.id, "Account deleted");
        Ok(user)
    }

    async fn admin_update(&self, id: Uuid, update: AdminUpdate) -> AppResult<User> {
        update.check()?;

        let user = self.uow.users().apply_admin_update(id, update).await?;
        tracing::info!(
            user_id = %user.id,
            balance = %user.balance,
            is_frozen = user.is_frozen,
            "Account updated by admin"
        );
        Ok(user)
    }

    async fn transaction_history(&self, id: Uuid) -> AppResult<Vec<Transaction>> {
        self.uow.transactions().list_for_account(id).await
    }
}
