//! Transaction database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Transaction, TransactionKind};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: String,
    #[sea_orm(column_type = "Decimal(Some((20, 2)))")]
    pub amount: Decimal,
    pub account_id: Uuid,
    pub requested_by: Uuid,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Transaction {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let kind: TransactionKind = model.kind.parse().map_err(AppError::internal)?;

        Ok(Transaction {
            id: model.id,
            kind,
            amount: model.amount,
            account_id: model.account_id,
            requested_by: model.requested_by,
            created_at: model.created_at,
        })
    }
}
