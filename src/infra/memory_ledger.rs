//! In-memory `Ledger` for tests and local experiments.
//!
//! The whole table sits behind one async mutex. A transaction holds the
//! lock from `begin` until it is committed, rolled back or dropped, and
//! works on a staged copy that only `commit` writes back.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::ledger::{Ledger, LedgerTransaction};
use crate::errors::{AppError, AppResult};

/// Account balances keyed by account number.
#[derive(Clone, Default)]
pub struct InMemoryLedger {
    accounts: Arc<Mutex<HashMap<i64, Decimal>>>,
    fail_adjustments_for: Option<i64>,
    transactions_started: Arc<AtomicUsize>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the ledger with `(account_number, balance)` pairs.
    pub fn with_accounts(accounts: impl IntoIterator<Item = (i64, Decimal)>) -> Self {
        Self {
            accounts: Arc::new(Mutex::new(accounts.into_iter().collect())),
            ..Self::default()
        }
    }

    /// Make every `adjust_balance` on `account_number` fail with a storage error.
    pub fn fail_adjustments_for(mut self, account_number: i64) -> Self {
        self.fail_adjustments_for = Some(account_number);
        self
    }

    /// Committed balance of an account.
    pub async fn balance(&self, account_number: i64) -> Option<Decimal> {
        self.accounts.lock().await.get(&account_number).copied()
    }

    /// Sum of all committed balances.
    pub async fn total(&self) -> Decimal {
        self.accounts.lock().await.values().copied().sum()
    }

    /// Number of transactions opened so far.
    pub fn transactions_started(&self) -> usize {
        self.transactions_started.load(Ordering::SeqCst)
    }
}

struct MemoryTransaction {
    committed: OwnedMutexGuard<HashMap<i64, Decimal>>,
    staged: HashMap<i64, Decimal>,
    fail_adjustments_for: Option<i64>,
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn begin(&self) -> AppResult<Box<dyn LedgerTransaction>> {
        let committed = self.accounts.clone().lock_owned().await;
        let staged = committed.clone();
        self.transactions_started.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(MemoryTransaction {
            committed,
            staged,
            fail_adjustments_for: self.fail_adjustments_for,
        }))
    }
}

#[async_trait]
impl LedgerTransaction for MemoryTransaction {
    async fn exists(&mut self, account_number: i64) -> AppResult<bool> {
        Ok(self.staged.contains_key(&account_number))
    }

    async fn get_balance(&mut self, account_number: i64) -> AppResult<Decimal> {
        self.staged
            .get(&account_number)
            .copied()
            .ok_or(AppError::NotFound)
    }

    async fn adjust_balance(&mut self, account_number: i64, delta: Decimal) -> AppResult<()> {
        if self.fail_adjustments_for == Some(account_number) {
            return Err(AppError::internal(format!(
                "injected failure adjusting account {}",
                account_number
            )));
        }

        let balance = self
            .staged
            .get_mut(&account_number)
            .ok_or(AppError::NotFound)?;
        *balance += delta;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryTransaction {
            mut committed,
            staged,
            ..
        } = *self;
        *committed = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dropped_transaction_discards_changes() {
        let ledger = InMemoryLedger::with_accounts([(1, Decimal::new(1000, 2))]);

        {
            let mut tx = ledger.begin().await.unwrap();
            tx.adjust_balance(1, Decimal::new(-500, 2)).await.unwrap();
        }

        assert_eq!(ledger.balance(1).await, Some(Decimal::new(1000, 2)));
    }

    #[tokio::test]
    async fn test_commit_publishes_changes() {
        let ledger = InMemoryLedger::with_accounts([(1, Decimal::new(1000, 2))]);

        let mut tx = ledger.begin().await.unwrap();
        tx.adjust_balance(1, Decimal::new(250, 2)).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(ledger.balance(1).await, Some(Decimal::new(1250, 2)));
        assert_eq!(ledger.transactions_started(), 1);
    }

    #[tokio::test]
    async fn test_adjusting_missing_account_is_not_found() {
        let ledger = InMemoryLedger::new();
        let mut tx = ledger.begin().await.unwrap();

        let result = tx.adjust_balance(42, Decimal::ONE).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }
}
