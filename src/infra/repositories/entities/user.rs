//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{PasswordReset, User, UserRole};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub role: String,
    #[sea_orm(column_type = "Decimal(Some((20, 2)))")]
    pub balance: Decimal,
    pub is_frozen: bool,
    pub auto_update_balance: bool,
    #[sea_orm(unique)]
    pub reset_password_token: Option<String>,
    pub reset_password_expires: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity.
///
/// A half-populated reset pair (token without expiry or the reverse) is
/// read as "no reset pending".
impl From<Model> for User {
    fn from(model: Model) -> Self {
        let reset = match (model.reset_password_token, model.reset_password_expires) {
            (Some(token), Some(expires_at)) => Some(PasswordReset { token, expires_at }),
            _ => None,
        };

        User {
            id: model.id,
            email: model.email,
            password_hash: model.password_hash,
            first_name: model.first_name,
            last_name: model.last_name,
            phone_number: model.phone_number,
            role: UserRole::from(model.role.as_str()),
            balance: model.balance,
            is_frozen: model.is_frozen,
            auto_update_balance: model.auto_update_balance,
            reset,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
