//! User service - profile lookups.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::UserDetails;
use crate::errors::{AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// The user with the accounts they own
    async fn get_details(&self, user_id: i32) -> AppResult<UserDetails>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_details(&self, user_id: i32) -> AppResult<UserDetails> {
        let users = self.uow.users();
        let accounts = self.uow.accounts();

        let (user, account) = tokio::try_join!(
            users.find_by_id(user_id),
            accounts.find_by_user(user_id)
        )?;

        let user = user.ok_or_not_found()?;
        Ok(UserDetails::new(user, account.into_iter().collect()))
    }
}
