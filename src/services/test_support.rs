//! Fixtures shared by service unit tests.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::config::Config;
use crate::domain::{Account, User};
use crate::errors::{AppError, AppResult};
use crate::infra::{
    AccountRepository, MockAccountRepository, MockUserRepository, TransactionContext, TxFuture,
    UnitOfWork, UserRepository,
};

/// Unit of Work over mock repositories. Transactions are unavailable.
pub struct StubUnitOfWork {
    users: Arc<MockUserRepository>,
    accounts: Arc<MockAccountRepository>,
}

impl StubUnitOfWork {
    pub fn new(users: MockUserRepository, accounts: MockAccountRepository) -> Self {
        Self {
            users: Arc::new(users),
            accounts: Arc::new(accounts),
        }
    }
}

#[async_trait]
impl UnitOfWork for StubUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn accounts(&self) -> Arc<dyn AccountRepository> {
        self.accounts.clone()
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        Err(AppError::internal("transactions need a database"))
    }
}

pub fn test_config() -> Config {
    Config::builder("unit-test-secret-that-is-at-least-32-bytes")
        .build()
        .unwrap()
}

pub fn sample_user(id: i32, username: &str) -> User {
    let now = Utc::now();
    User {
        id,
        username: username.to_string(),
        password_hash: String::new(),
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_account(id: i32, user_id: i32, account_number: i64) -> Account {
    let now = Utc::now();
    Account {
        id,
        user_id,
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        hobby: None,
        age: Some(36),
        account_number,
        balance: Decimal::new(50_000, 2),
        created_at: now,
        updated_at: now,
    }
}
