//! Infrastructure layer - External systems integration
//!
//! - PostgreSQL via SeaORM (repositories, unit of work, migrations)
//! - In-memory store implementing the same contracts
//! - Redis for rate limiting
//! - Mailjet mail transport

pub mod cache;
pub mod db;
pub mod mailer;
pub mod memory;
pub mod repositories;
pub mod unit_of_work;

pub use cache::Cache;
pub use db::{Database, Migrator};
pub use mailer::Mailer;
pub use memory::InMemoryStore;
pub use repositories::{TransactionRepository, TransactionStore, UserRepository, UserStore};
pub use unit_of_work::{Persistence, TransactionContext, TxLedger, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockTransactionRepository, MockUserRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use unit_of_work::MockUnitOfWork;
