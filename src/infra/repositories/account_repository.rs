//! Account repository implementation.
//!
//! Plain reads and writes outside a transaction. Balance changes that must
//! serialize with transfers go through `TransactionContext::accounts`.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use super::conflict_on_unique;
use super::entities::account::{self, ActiveModel, Entity as AccountEntity};
use crate::domain::{Account, NewAccount};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Account repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find account by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Account>>;

    /// Find the account owned by a user
    async fn find_by_user(&self, user_id: i32) -> AppResult<Option<Account>>;

    /// Check whether an account number is already in use
    async fn account_number_taken(&self, account_number: i64) -> AppResult<bool>;

    /// Insert a new account. A unique-index violation is a `Conflict`.
    async fn create(
        &self,
        user_id: i32,
        account: NewAccount,
        account_number: i64,
    ) -> AppResult<Account>;

    /// One page of accounts ordered by ID, plus the total count
    async fn list(&self, params: PaginationParams) -> AppResult<(Vec<Account>, u64)>;

    /// Delete account by ID
    async fn delete(&self, id: i32) -> AppResult<()>;
}

/// Concrete implementation of AccountRepository
pub struct AccountStore {
    db: DatabaseConnection,
}

impl AccountStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountRepository for AccountStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Account>> {
        let result = AccountEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Account::from))
    }

    async fn find_by_user(&self, user_id: i32) -> AppResult<Option<Account>> {
        let result = AccountEntity::find()
            .filter(account::Column::UserId.eq(user_id))
            .order_by_asc(account::Column::Id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Account::from))
    }

    async fn account_number_taken(&self, account_number: i64) -> AppResult<bool> {
        let count = AccountEntity::find()
            .filter(account::Column::AccountNumber.eq(account_number))
            .count(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }

    async fn create(
        &self,
        user_id: i32,
        account: NewAccount,
        account_number: i64,
    ) -> AppResult<Account> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            user_id: Set(user_id),
            first_name: Set(account.first_name),
            last_name: Set(account.last_name),
            hobby: Set(account.hobby),
            age: Set(account.age),
            account_number: Set(account_number),
            balance: Set(account.balance),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| conflict_on_unique(e, "Account"))?;

        Ok(Account::from(model))
    }

    async fn list(&self, params: PaginationParams) -> AppResult<(Vec<Account>, u64)> {
        let paginator = AccountEntity::find()
            .order_by_asc(account::Column::Id)
            .paginate(&self.db, params.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page.saturating_sub(1)).await?;

        Ok((models.into_iter().map(Account::from).collect(), total))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = AccountEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
