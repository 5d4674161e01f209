//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and runs multi-statement operations in a
//! single database transaction. `Persistence` is also the database-backed
//! `Ledger` used by the transfer engine (see `ledger.rs`).

use async_trait::async_trait;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};
use std::sync::Arc;

use super::repositories::{AccountRepository, AccountStore, UserRepository, UserStore};
use crate::domain::{Account, AccountChanges};
use crate::errors::{AppError, AppResult};

/// Boxed future returned by transaction closures.
pub type TxFuture<'a, T> =
    std::pin::Pin<Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>>;

/// Unit of Work trait for dependency injection.
///
/// Not mockable directly because of the generic `transaction` method.
/// Services are tested with mock repositories or at the HTTP level.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get account repository
    fn accounts(&self) -> Arc<dyn AccountRepository>;

    /// Execute a closure within a READ COMMITTED transaction.
    ///
    /// Committed when the closure returns `Ok`, rolled back otherwise.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Repository access bound to one open transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Get account repository for this transaction
    pub fn accounts(&self) -> TxAccountRepository<'_> {
        TxAccountRepository::new(self.txn)
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    account_repo: Arc<AccountStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        let user_repo = Arc::new(UserStore::new(db.clone()));
        let account_repo = Arc::new(AccountStore::new(db.clone()));
        Self {
            db,
            user_repo,
            account_repo,
        }
    }

    /// Open a read-write transaction at READ COMMITTED.
    pub(super) async fn begin_read_committed(&self) -> AppResult<DatabaseTransaction> {
        self.db
            .begin_with_config(
                Some(IsolationLevel::ReadCommitted),
                Some(AccessMode::ReadWrite),
            )
            .await
            .map_err(AppError::from)
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn accounts(&self) -> Arc<dyn AccountRepository> {
        self.account_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self.begin_read_committed().await?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
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

/// Transaction-aware account repository.
///
/// Reads taken through `find_by_id_for_update` hold the row lock until the
/// surrounding transaction ends, so updates serialize with transfers.
pub struct TxAccountRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxAccountRepository<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Find account by ID and lock the row (`SELECT ... FOR UPDATE`)
    pub async fn find_by_id_for_update(&self, id: i32) -> AppResult<Option<Account>> {
        use super::repositories::entities::account::Entity as AccountEntity;
        use sea_orm::{EntityTrait, QuerySelect};

        let result = AccountEntity::find_by_id(id)
            .lock_exclusive()
            .one(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Account::from))
    }

    /// Apply a partial update. Absent fields keep their current value.
    pub async fn update(&self, id: i32, changes: AccountChanges) -> AppResult<Account> {
        use super::repositories::entities::account::{ActiveModel, Entity as AccountEntity};
        use sea_orm::{ActiveModelTrait, EntityTrait, Set};

        let account = AccountEntity::find_by_id(id)
            .one(self.txn)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = account.into();

        if let Some(first_name) = changes.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(hobby) = changes.hobby {
            active.hobby = Set(Some(hobby));
        }
        if let Some(age) = changes.age {
            active.age = Set(Some(age));
        }
        if let Some(balance) = changes.balance {
            active.balance = Set(balance);
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(self.txn).await.map_err(AppError::from)?;

        Ok(Account::from(model))
    }
}

/// Shorthand for running a block inside `UnitOfWork::transaction`.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| Box::pin(async move { $body })).await
    };
}
