//! Ledger capability used by the transfer engine.
//!
//! A `LedgerTransaction` is one open storage transaction over account
//! balances. Dropping it without `commit` discards every change made
//! through it.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QuerySelect};

use super::repositories::entities::account::{self, Entity as AccountEntity};
use super::unit_of_work::Persistence;
use crate::errors::{AppError, AppResult};

/// Source of ledger transactions.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn begin(&self) -> AppResult<Box<dyn LedgerTransaction>>;
}

/// Balance operations inside one transaction.
#[async_trait]
pub trait LedgerTransaction: Send {
    /// Whether the account exists. Locks the row until the transaction ends.
    async fn exists(&mut self, account_number: i64) -> AppResult<bool>;

    /// Current balance, `NotFound` if the account is missing.
    async fn get_balance(&mut self, account_number: i64) -> AppResult<Decimal>;

    /// Add `delta` (may be negative) in place, `NotFound` if no row matched.
    async fn adjust_balance(&mut self, account_number: i64, delta: Decimal) -> AppResult<()>;

    async fn commit(self: Box<Self>) -> AppResult<()>;

    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// Postgres-backed ledger transaction.
struct TxLedger {
    txn: DatabaseTransaction,
}

#[async_trait]
impl Ledger for Persistence {
    async fn begin(&self) -> AppResult<Box<dyn LedgerTransaction>> {
        let txn = self.begin_read_committed().await?;
        Ok(Box::new(TxLedger { txn }))
    }
}

#[async_trait]
impl LedgerTransaction for TxLedger {
    async fn exists(&mut self, account_number: i64) -> AppResult<bool> {
        let locked = AccountEntity::find()
            .select_only()
            .column(account::Column::Id)
            .filter(account::Column::AccountNumber.eq(account_number))
            .lock_exclusive()
            .into_tuple::<i32>()
            .one(&self.txn)
            .await?;

        Ok(locked.is_some())
    }

    async fn get_balance(&mut self, account_number: i64) -> AppResult<Decimal> {
        AccountEntity::find()
            .select_only()
            .column(account::Column::Balance)
            .filter(account::Column::AccountNumber.eq(account_number))
            .into_tuple::<Decimal>()
            .one(&self.txn)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn adjust_balance(&mut self, account_number: i64, delta: Decimal) -> AppResult<()> {
        let result = AccountEntity::update_many()
            .col_expr(
                account::Column::Balance,
                Expr::col(account::Column::Balance).add(delta),
            )
            .col_expr(account::Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(account::Column::AccountNumber.eq(account_number))
            .exec(&self.txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.txn.commit().await.map_err(AppError::from)
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.txn.rollback().await.map_err(AppError::from)
    }
}
