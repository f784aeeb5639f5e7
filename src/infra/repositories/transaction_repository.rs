//! Transaction (ledger) repository.
//!
//! Append-only: there is no update or delete.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::transaction::{self, ActiveModel, Entity as TransactionEntity};
use crate::domain::Transaction;
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Ledger contract. Records are immutable once created.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Append a record
    async fn create(&self, tx: Transaction) -> AppResult<Transaction>;

    /// All records for an account, newest first
    async fn list_for_account(&self, account_id: Uuid) -> AppResult<Vec<Transaction>>;
}

/// SeaORM-backed ledger outside any database transaction
pub struct TransactionStore {
    db: DatabaseConnection,
}

impl TransactionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Insert on any connection; the unit of work runs it inside a database
/// transaction.
pub(crate) async fn insert<C: ConnectionTrait>(conn: &C, tx: Transaction) -> AppResult<Transaction> {
    let active_model = ActiveModel {
        id: Set(tx.id),
        kind: Set(tx.kind.as_str().to_string()),
        amount: Set(tx.amount),
        account_id: Set(tx.account_id),
        requested_by: Set(tx.requested_by),
        created_at: Set(tx.created_at),
    };

    let model = active_model.insert(conn).await?;
    Transaction::try_from(model)
}

/// Account history on any connection, newest first
pub(crate) async fn history<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
) -> AppResult<Vec<Transaction>> {
    let models = TransactionEntity::find()
        .filter(transaction::Column::AccountId.eq(account_id))
        .order_by_desc(transaction::Column::CreatedAt)
        .all(conn)
        .await?;

    models.into_iter().map(Transaction::try_from).collect()
}

#[async_trait]
impl TransactionRepository for TransactionStore {
    async fn create(&self, tx: Transaction) -> AppResult<Transaction> {
        insert(&self.db, tx).await
    }

    async fn list_for_account(&self, account_id: Uuid) -> AppResult<Vec<Transaction>> {
        history(&self.db, account_id).await
    }
}
