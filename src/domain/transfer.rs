//! Transfer intent and the transfer error taxonomy.

use rust_decimal::Decimal;
use thiserror::Error;

use super::account::validate_money;
use crate::errors::AppError;

/// Why a transfer did not happen.
///
/// Every variant except `TransactionFailure` is detected before any
/// balance is touched; `TransactionFailure` means the transaction was
/// rolled back.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Transfer amount must be positive with at most 2 decimal places")]
    InvalidAmount,

    #[error("Source and destination accounts must differ")]
    SameAccount,

    #[error("One or both accounts not found")]
    AccountsNotFound,

    #[error("Insufficient balance in the source account")]
    InsufficientBalance,

    #[error("Transfer transaction failed")]
    TransactionFailure(#[source] Box<AppError>),
}

impl TransferError {
    /// Wrap a storage failure
    pub fn storage(error: AppError) -> Self {
        TransferError::TransactionFailure(Box::new(error))
    }

    /// Stable, machine-readable error code for clients
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::InvalidAmount => "INVALID_AMOUNT",
            TransferError::SameAccount => "SAME_ACCOUNT",
            TransferError::AccountsNotFound => "ACCOUNTS_NOT_FOUND",
            TransferError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            TransferError::TransactionFailure(_) => "TRANSACTION_FAILURE",
        }
    }
}

/// Reject zero, negative and sub-cent amounts.
pub fn validate_amount(amount: Decimal) -> Result<(), TransferError> {
    if amount <= Decimal::ZERO || validate_money(amount).is_err() {
        return Err(TransferError::InvalidAmount);
    }
    Ok(())
}

/// A validated request to move `amount` between two accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferIntent {
    from_account_number: i64,
    to_account_number: i64,
    amount: Decimal,
}

impl TransferIntent {
    pub fn new(
        from_account_number: i64,
        to_account_number: i64,
        amount: Decimal,
    ) -> Result<Self, TransferError> {
        validate_amount(amount)?;
        if from_account_number == to_account_number {
            return Err(TransferError::SameAccount);
        }

        Ok(Self {
            from_account_number,
            to_account_number,
            amount,
        })
    }

    pub fn from_account_number(&self) -> i64 {
        self.from_account_number
    }

    pub fn to_account_number(&self) -> i64 {
        self.to_account_number
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Both account numbers, ascending. Rows are locked in this order.
    pub fn lock_order(&self) -> [i64; 2] {
        let (a, b) = (self.from_account_number, self.to_account_number);
        if a < b {
            [a, b]
        } else {
            [b, a]
        }
    }
}
