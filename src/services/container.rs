//! Service container - builds every service over one connection pool.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::{
    AccountManager, AccountService, AuthService, Authenticator, TransferEngine, TransferService,
    UserManager, UserService,
};
use crate::config::Config;
use crate::infra::Persistence;

/// All application services behind their traits.
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    account_service: Arc<dyn AccountService>,
    transfer_service: Arc<dyn TransferService>,
}

impl Services {
    /// Assemble a container from already-built services
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        account_service: Arc<dyn AccountService>,
        transfer_service: Arc<dyn TransferService>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            account_service,
            transfer_service,
        }
    }

    /// Build the Postgres-backed services
    pub fn from_connection(db: DatabaseConnection, config: Config) -> Self {
        let uow = Arc::new(Persistence::new(db.clone()));

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config)),
            user_service: Arc::new(UserManager::new(uow.clone())),
            account_service: Arc::new(AccountManager::new(uow)),
            transfer_service: Arc::new(TransferEngine::new(Persistence::new(db))),
        }
    }

    pub fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    pub fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    pub fn accounts(&self) -> Arc<dyn AccountService> {
        self.account_service.clone()
    }

    pub fn transfers(&self) -> Arc<dyn TransferService> {
        self.transfer_service.clone()
    }
}
