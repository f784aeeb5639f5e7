//! Domain layer - Core business entities and logic
//!
//! Accounts, money, ledger records and password-reset grants,
//! independent of storage and transport.

pub mod money;
pub mod password;
pub mod reset_token;
pub mod transaction;
pub mod user;

pub use money::Amount;
pub use password::Password;
pub use reset_token::PasswordReset;
pub use transaction::{NewWithdrawal, Transaction, TransactionKind, TransactionResponse};
pub use user::{
    normalize_email, AdminUpdate, NewUser, ProfileUpdate, RegisterUser, User, UserResponse,
    UserRole,
};
