//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::Database;
use crate::services::{AccountService, AuthService, Services, TransferService, UserService};

/// Application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub account_service: Arc<dyn AccountService>,
    pub transfer_service: Arc<dyn TransferService>,
    /// Database handle, used by the health check
    pub database: Arc<Database>,
}

impl AppState {
    /// Build the Postgres-backed services over `database`.
    pub fn from_config(database: Arc<Database>, config: Config) -> Self {
        let services = Services::from_connection(database.get_connection(), config);
        Self::new(services, database)
    }

    /// Create state from an assembled service container.
    pub fn new(services: Services, database: Arc<Database>) -> Self {
        Self {
            auth_service: services.auth(),
            user_service: services.users(),
            account_service: services.accounts(),
            transfer_service: services.transfers(),
            database,
        }
    }
}
