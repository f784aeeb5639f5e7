//! Ledger records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::money::Amount;

pub const KIND_DEPOSIT: &str = "deposit";
pub const KIND_WITHDRAWAL: &str = "withdrawal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => KIND_DEPOSIT,
            TransactionKind::Withdrawal => KIND_WITHDRAWAL,
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            KIND_DEPOSIT => Ok(TransactionKind::Deposit),
            KIND_WITHDRAWAL => Ok(TransactionKind::Withdrawal),
            other => Err(format!("unknown transaction kind: {}", other)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of a balance-affecting event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub amount: Decimal,
    /// Account whose balance and history the record belongs to
    pub account_id: Uuid,
    /// Authenticated user who asked for it
    pub requested_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A withdrawal about to be recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWithdrawal {
    pub account_id: Uuid,
    pub amount: Amount,
    pub requested_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[schema(value_type = String, example = "200.00")]
    pub amount: Decimal,
    pub account_id: Uuid,
    pub requested_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            kind: tx.kind,
            amount: tx.amount,
            account_id: tx.account_id,
            requested_by: tx.requested_by,
            created_at: tx.created_at,
        }
    }
}
