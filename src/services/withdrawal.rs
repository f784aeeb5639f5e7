//! Withdrawal flow.
//!
//! Validate the amount, then debit and record in one database transaction,
//! then notify the account holder and the operator. Notifications run
//! after the commit and can never undo it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::emails;
use super::notification::{notify, Notifier};
use crate::config::WITHDRAWAL_ACCEPTED_MESSAGE;
use crate::domain::{Amount, NewWithdrawal, Transaction};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Outcome of an accepted withdrawal
#[derive(Debug, Clone)]
pub struct WithdrawalReceipt {
    pub message: String,
    pub transaction: Transaction,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait WithdrawalService: Send + Sync {
    /// Withdraw `amount` from `user_id` on behalf of `requested_by`.
    ///
    /// # Errors
    /// `InvalidAmount`, `UserNotFound`, `InsufficientFunds` with no side
    /// effects; `Database` if the write fails, also with no side effects.
    async fn request_withdrawal(
        &self,
        user_id: Uuid,
        amount: Decimal,
        requested_by: Uuid,
    ) -> AppResult<WithdrawalReceipt>;
}

/// Withdrawal service over any [`UnitOfWork`].
///
/// Both notifications go out concurrently once the debit has committed:
/// one to the account holder, one to `operator_email`.
pub struct WithdrawalManager<U: UnitOfWork> {
    uow: Arc<U>,
    notifier: Arc<dyn Notifier>,
    operator_email: String,
}

impl<U: UnitOfWork> WithdrawalManager<U> {
    pub fn new(uow: Arc<U>, notifier: Arc<dyn Notifier>, operator_email: impl Into<String>) -> Self {
        Self {
            uow,
            notifier,
            operator_email: operator_email.into(),
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> WithdrawalService for WithdrawalManager<U> {
    async fn request_withdrawal(
        &self,
        user_id: Uuid,
        amount: Decimal,
        requested_by: Uuid,
    ) -> AppResult<WithdrawalReceipt> {
        let amount = Amount::new(amount)?;

        let user = self
            .uow
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        // Early answer only; the debit re-checks atomically
        if user.balance < amount.value() {
            return Err(AppError::InsufficientFunds);
        }

        let transaction = self
            .uow
            .record_withdrawal(NewWithdrawal {
                account_id: user_id,
                amount,
                requested_by,
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(
            user_id = %user_id,
            requested_by = %requested_by,
            amount = %amount,
            transaction_id = %transaction.id,
            "Withdrawal recorded"
        );

        let notifier = self.notifier.as_ref();
        futures::join!(
            notify(notifier, emails::user_withdrawal(&user, amount.value()), "withdrawal_user"),
            notify(
                notifier,
                emails::admin_withdrawal(&user, amount.value(), &self.operator_email),
                "withdrawal_operator",
            ),
        );

        Ok(WithdrawalReceipt {
            message: WITHDRAWAL_ACCEPTED_MESSAGE.to_string(),
            transaction,
        })
    }
}
