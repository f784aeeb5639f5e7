//! In-memory store.
//!
//! Implements the user, transaction and unit-of-work contracts over plain
//! collections behind one async lock. Every operation holds the write lock
//! for its whole read-check-write sequence, which gives it the same
//! atomicity the database gets from conditional statements.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repositories::{TransactionRepository, UserRepository};
use super::unit_of_work::UnitOfWork;
use crate::domain::{
    AdminUpdate, NewUser, NewWithdrawal, PasswordReset, Transaction, TransactionKind, User,
    UserRole,
};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[derive(Debug, Default)]
struct State {
    users: HashMap<Uuid, User>,
    /// Append order
    transactions: Vec<Transaction>,
}

/// Cloneable handle; clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Promote an account to admin.
    pub async fn set_role(&self, id: Uuid, role: UserRole) -> AppResult<()> {
        let mut state = self.state.write().await;
        let user = state.users.get_mut(&id).ok_or(AppError::NotFound)?;
        user.role = role;
        Ok(())
    }

    /// Number of ledger records across all accounts
    pub async fn transaction_count(&self) -> usize {
        self.state.read().await.transactions.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| matches!(&u.reset, Some(reset) if reset.accepts(token, now)))
            .cloned())
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == new_user.email) {
            return Err(AppError::conflict("User with this email"));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            password_hash: new_user.password_hash,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            phone_number: new_user.phone_number,
            role: UserRole::User,
            balance: Decimal::ZERO,
            is_frozen: false,
            auto_update_balance: false,
            reset: None,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        let mut state = self.state.write().await;
        let stored = state.users.get_mut(&user.id).ok_or(AppError::NotFound)?;

        stored.email = user.email.clone();
        stored.password_hash = user.password_hash.clone();
        stored.first_name = user.first_name.clone();
        stored.last_name = user.last_name.clone();
        stored.phone_number = user.phone_number.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn set_reset_token(&self, id: Uuid, reset: PasswordReset) -> AppResult<()> {
        let mut state = self.state.write().await;
        let stored = state.users.get_mut(&id).ok_or(AppError::UserNotFound)?;
        stored.reset = Some(reset);
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn consume_reset_token(
        &self,
        token: &str,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        let mut state = self.state.write().await;
        let holder = state
            .users
            .values_mut()
            .find(|u| matches!(&u.reset, Some(reset) if reset.accepts(token, now)));

        Ok(holder.map(|user| {
            user.password_hash = password_hash;
            user.reset = None;
            user.updated_at = now;
            user.clone()
        }))
    }

    async fn apply_admin_update(&self, id: Uuid, update: AdminUpdate) -> AppResult<User> {
        let mut state = self.state.write().await;
        let stored = state.users.get_mut(&id).ok_or(AppError::NotFound)?;

        if let Some(balance) = update.balance {
            stored.balance = balance;
        }
        if let Some(is_frozen) = update.is_frozen {
            stored.is_frozen = is_frozen;
        }
        if let Some(auto_update_balance) = update.auto_update_balance {
            stored.auto_update_balance = auto_update_balance;
        }
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<User> {
        self.state
            .write()
            .await
            .users
            .remove(&id)
            .ok_or(AppError::NotFound)
    }

    async fn list(&self, params: &PaginationParams) -> AppResult<(Vec<User>, u64)> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);

        let total = users.len() as u64;
        let page = users
            .into_iter()
            .skip(params.offset() as usize)
            .take(params.limit() as usize)
            .collect();
        Ok((page, total))
    }
}

#[async_trait]
impl TransactionRepository for InMemoryStore {
    async fn create(&self, tx: Transaction) -> AppResult<Transaction> {
        self.state.write().await.transactions.push(tx.clone());
        Ok(tx)
    }

    async fn list_for_account(&self, account_id: Uuid) -> AppResult<Vec<Transaction>> {
        let state = self.state.read().await;
        let mut history: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|tx| tx.account_id == account_id)
            .cloned()
            .collect();
        // Newest first; append order breaks timestamp ties
        history.reverse();
        history.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(history)
    }
}

#[async_trait]
impl UnitOfWork for InMemoryStore {
    fn users(&self) -> Arc<dyn UserRepository> {
        Arc::new(self.clone())
    }

    fn transactions(&self) -> Arc<dyn TransactionRepository> {
        Arc::new(self.clone())
    }

    async fn record_withdrawal(&self, withdrawal: NewWithdrawal) -> AppResult<Transaction> {
        let mut state = self.state.write().await;
        let amount = withdrawal.amount.value();

        let account = state
            .users
            .get_mut(&withdrawal.account_id)
            .ok_or(AppError::UserNotFound)?;
        if account.balance < amount {
            return Err(AppError::InsufficientFunds);
        }
        account.balance -= amount;
        account.updated_at = Utc::now();

        let tx = Transaction {
            id: Uuid::new_v4(),
            kind: TransactionKind::Withdrawal,
            amount,
            account_id: withdrawal.account_id,
            requested_by: withdrawal.requested_by,
            created_at: withdrawal.created_at,
        };
        state.transactions.push(tx.clone());
        Ok(tx)
    }
}
