//! Infrastructure layer - External systems integration
//!
//! - Database connection and migrations
//! - Repositories over the `users` and `accounts` tables
//! - Unit of Work for transaction management
//! - Ledger backends for the transfer engine (Postgres and in-memory)

pub mod db;
pub mod ledger;
pub mod memory_ledger;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use ledger::{Ledger, LedgerTransaction};
pub use memory_ledger::InMemoryLedger;
pub use repositories::{AccountRepository, AccountStore, UserRepository, UserStore};
pub use unit_of_work::{Persistence, TransactionContext, TxAccountRepository, TxFuture, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockAccountRepository, MockUserRepository};
