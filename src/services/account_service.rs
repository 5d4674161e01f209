//! Account service - account CRUD with ownership checks.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::ACCOUNT_NUMBER_MAX_ATTEMPTS;
use crate::domain::{generate_account_number, validate_money, Account, AccountChanges, NewAccount};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

/// Account service trait for dependency injection.
///
/// Every operation on a single account takes the caller's user id and
/// answers `Forbidden` when the caller does not own the account.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Open the caller's account. A user owns at most one.
    async fn create_account(&self, user_id: i32, account: NewAccount) -> AppResult<Account>;

    /// One page of all accounts
    async fn list_accounts(&self, params: PaginationParams) -> AppResult<Paginated<Account>>;

    async fn get_account(&self, user_id: i32, id: i32) -> AppResult<Account>;

    /// Partial update, serialized with transfers on the same row
    async fn update_account(
        &self,
        user_id: i32,
        id: i32,
        changes: AccountChanges,
    ) -> AppResult<Account>;

    async fn delete_account(&self, user_id: i32, id: i32) -> AppResult<()>;

    /// The account owned by `user_id`, if any
    async fn account_of(&self, user_id: i32) -> AppResult<Option<Account>>;
}

/// Concrete implementation of AccountService using Unit of Work.
pub struct AccountManager<U: UnitOfWork> {
    uow: Arc<U>,
    next_account_number: fn() -> i64,
}

impl<U: UnitOfWork> AccountManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self {
            uow,
            next_account_number: generate_account_number,
        }
    }

    /// Replace the account-number generator.
    pub fn with_number_source(mut self, source: fn() -> i64) -> Self {
        self.next_account_number = source;
        self
    }

    async fn owned_account(&self, user_id: i32, id: i32) -> AppResult<Account> {
        let account = self
            .uow
            .accounts()
            .find_by_id(id)
            .await?
            .ok_or_not_found()?;

        if !account.is_owned_by(user_id) {
            tracing::warn!(user_id, account_id = id, "Account access denied");
            return Err(AppError::Forbidden);
        }

        Ok(account)
    }

    async fn allocate_account_number(&self) -> AppResult<i64> {
        let accounts = self.uow.accounts();

        for attempt in 1..=ACCOUNT_NUMBER_MAX_ATTEMPTS {
            let candidate = (self.next_account_number)();
            if !accounts.account_number_taken(candidate).await? {
                return Ok(candidate);
            }
            tracing::debug!(attempt, candidate, "Account number taken, redrawing");
        }

        Err(AppError::internal(format!(
            "no free account number after {} attempts",
            ACCOUNT_NUMBER_MAX_ATTEMPTS
        )))
    }
}

#[async_trait]
impl<U: UnitOfWork> AccountService for AccountManager<U> {
    async fn create_account(&self, user_id: i32, account: NewAccount) -> AppResult<Account> {
        validate_money(account.balance).map_err(AppError::Validation)?;

        if self.uow.accounts().find_by_user(user_id).await?.is_some() {
            return Err(AppError::conflict("Account"));
        }

        let account_number = self.allocate_account_number().await?;
        let created = self
            .uow
            .accounts()
            .create(user_id, account, account_number)
            .await?;

        tracing::info!(
            user_id,
            account_id = created.id,
            account_number = created.account_number,
            "Account created"
        );
        Ok(created)
    }

    async fn list_accounts(&self, params: PaginationParams) -> AppResult<Paginated<Account>> {
        let params = params.normalized();
        let (accounts, total) = self.uow.accounts().list(params).await?;
        Ok(Paginated::new(accounts, params, total))
    }

    async fn get_account(&self, user_id: i32, id: i32) -> AppResult<Account> {
        self.owned_account(user_id, id).await
    }

    async fn update_account(
        &self,
        user_id: i32,
        id: i32,
        changes: AccountChanges,
    ) -> AppResult<Account> {
        if changes.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }
        if let Some(balance) = changes.balance {
            validate_money(balance).map_err(AppError::Validation)?;
        }

        let updated = crate::with_transaction!(self.uow, |ctx| {
            let accounts = ctx.accounts();
            let account = accounts
                .find_by_id_for_update(id)
                .await?
                .ok_or(AppError::NotFound)?;

            if !account.is_owned_by(user_id) {
                return Err(AppError::Forbidden);
            }

            accounts.update(id, changes).await
        })?;

        tracing::info!(user_id, account_id = id, "Account updated");
        Ok(updated)
    }

    async fn delete_account(&self, user_id: i32, id: i32) -> AppResult<()> {
        self.owned_account(user_id, id).await?;
        self.uow.accounts().delete(id).await?;

        tracing::info!(user_id, account_id = id, "Account deleted");
        Ok(())
    }

    async fn account_of(&self, user_id: i32) -> AppResult<Option<Account>> {
        self.uow.accounts().find_by_user(user_id).await
    }
}
