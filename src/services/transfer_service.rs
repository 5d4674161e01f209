//! Transfer engine - moves funds between two accounts atomically.
//!
//! Amount and account-pair checks run before any storage access. Existence
//! and balance checks run inside the same transaction as the updates, with
//! both rows locked in ascending account-number order.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{TransferError, TransferIntent};
use crate::errors::AppError;
use crate::infra::{Ledger, LedgerTransaction};

/// Transfer service trait for dependency injection.
#[async_trait]
pub trait TransferService: Send + Sync {
    /// Move `amount` from one account to another. Not idempotent.
    async fn transfer(
        &self,
        from_account_number: i64,
        to_account_number: i64,
        amount: Decimal,
    ) -> Result<(), TransferError>;
}

/// `TransferService` over any `Ledger` backend.
pub struct TransferEngine<L: Ledger> {
    ledger: L,
}

impl<L: Ledger> TransferEngine<L> {
    pub fn new(ledger: L) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }
}

async fn apply(
    tx: &mut dyn LedgerTransaction,
    intent: &TransferIntent,
) -> Result<(), TransferError> {
    for account_number in intent.lock_order() {
        if !tx.exists(account_number).await.map_err(TransferError::storage)? {
            return Err(TransferError::AccountsNotFound);
        }
    }

    let balance = tx
        .get_balance(intent.from_account_number())
        .await
        .map_err(missing_or_storage)?;
    if balance < intent.amount() {
        return Err(TransferError::InsufficientBalance);
    }

    tx.adjust_balance(intent.from_account_number(), -intent.amount())
        .await
        .map_err(missing_or_storage)?;
    tx.adjust_balance(intent.to_account_number(), intent.amount())
        .await
        .map_err(missing_or_storage)?;

    Ok(())
}

fn missing_or_storage(error: AppError) -> TransferError {
    match error {
        AppError::NotFound => TransferError::AccountsNotFound,
        other => TransferError::storage(other),
    }
}

impl<L: Ledger> TransferEngine<L> {
    async fn execute(
        &self,
        from_account_number: i64,
        to_account_number: i64,
        amount: Decimal,
    ) -> Result<(), TransferError> {
        let intent = TransferIntent::new(from_account_number, to_account_number, amount)?;

        let mut tx = self.ledger.begin().await.map_err(TransferError::storage)?;

        match apply(tx.as_mut(), &intent).await {
            Ok(()) => tx.commit().await.map_err(TransferError::storage),
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!("Transfer rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl<L: Ledger> TransferService for TransferEngine<L> {
    async fn transfer(
        &self,
        from_account_number: i64,
        to_account_number: i64,
        amount: Decimal,
    ) -> Result<(), TransferError> {
        let outcome = self
            .execute(from_account_number, to_account_number, amount)
            .await;

        match &outcome {
            Ok(()) => tracing::info!(
                from_account_number,
                to_account_number,
                %amount,
                "Transfer completed"
            ),
            Err(TransferError::TransactionFailure(source)) => tracing::error!(
                from_account_number,
                to_account_number,
                %amount,
                "Transfer failed: {}",
                source
            ),
            Err(e) => tracing::warn!(
                from_account_number,
                to_account_number,
                %amount,
                code = e.code(),
                "Transfer rejected: {}",
                e
            ),
        }

        outcome
    }
}
