//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and owns the multi-statement writes that
//! must commit or roll back together.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, AccessMode, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IsolationLevel, QueryFilter, TransactionTrait,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use uuid::Uuid;

use super::repositories::entities::user::{self, Entity as UserEntity};
use super::repositories::{
    insert_transaction, transaction_history, TransactionRepository, TransactionStore,
    UserRepository, UserStore,
};
use crate::domain::{Amount, NewWithdrawal, Transaction, TransactionKind};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Unit of Work trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn transactions(&self) -> Arc<dyn TransactionRepository>;

    /// Debit the account and append the withdrawal record atomically.
    ///
    /// # Errors
    /// `UserNotFound` if the account does not exist, `InsufficientFunds` if
    /// the balance is below the amount at the moment of the debit. Neither
    /// leaves any write behind.
    async fn record_withdrawal(&self, withdrawal: NewWithdrawal) -> AppResult<Transaction>;
}

type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Repository access scoped to one open database transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn ledger(&self) -> TxLedger<'_> {
        TxLedger { txn: self.txn }
    }
}

/// Balance and ledger writes inside a transaction.
///
/// Implements [`TransactionRepository`] so ledger appends go through the
/// same contract as outside a transaction.
pub struct TxLedger<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxLedger<'a> {
    /// `balance = balance - amount` guarded by `balance >= amount`.
    pub async fn debit(&self, account_id: Uuid, amount: Amount) -> AppResult<()> {
        let amount = amount.value();
        let result = UserEntity::update_many()
            .col_expr(user::Column::Balance, Expr::col(user::Column::Balance).sub(amount))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(account_id))
            .filter(user::Column::Balance.gte(amount))
            .exec(self.txn)
            .await?;

        if result.rows_affected == 1 {
            return Ok(());
        }

        // Nothing matched: tell a missing account from a short balance
        let exists = UserEntity::find_by_id(account_id).one(self.txn).await?.is_some();
        if exists {
            Err(AppError::InsufficientFunds)
        } else {
            Err(AppError::UserNotFound)
        }
    }
}

#[async_trait]
impl TransactionRepository for TxLedger<'_> {
    async fn create(&self, tx: Transaction) -> AppResult<Transaction> {
        insert_transaction(self.txn, tx).await
    }

    async fn list_for_account(&self, account_id: Uuid) -> AppResult<Vec<Transaction>> {
        transaction_history(self.txn, account_id).await
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    transaction_repo: Arc<TransactionStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        let user_repo = Arc::new(UserStore::new(db.clone()));
        let transaction_repo = Arc::new(TransactionStore::new(db.clone()));
        Self {
            db,
            user_repo,
            transaction_repo,
        }
    }

    /// Run `f` inside a ReadCommitted transaction.
    ///
    /// Committed when `f` succeeds, rolled back otherwise.
    pub async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::ReadCommitted), Some(AccessMode::ReadWrite))
            .await?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn transactions(&self) -> Arc<dyn TransactionRepository> {
        self.transaction_repo.clone()
    }

    async fn record_withdrawal(&self, withdrawal: NewWithdrawal) -> AppResult<Transaction> {
        self.transaction(move |ctx| {
            Box::pin(async move {
                let ledger = ctx.ledger();
                ledger.debit(withdrawal.account_id, withdrawal.amount).await?;
                ledger
                    .create(Transaction {
                        id: Uuid::new_v4(),
                        kind: TransactionKind::Withdrawal,
                        amount: withdrawal.amount.value(),
                        account_id: withdrawal.account_id,
                        requested_by: withdrawal.requested_by,
                        created_at: withdrawal.created_at,
                    })
                    .await
            })
        })
        .await
    }
}
