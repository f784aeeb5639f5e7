//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.
//! `transactions.account_id` carries no foreign key, so neither entity
//! declares a relation.

pub mod transaction;
pub mod user;
