//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on traits so handlers can be
//! tested against hand-written or mocked implementations.

mod account_service;
mod auth_service;
pub mod container;
mod transfer_service;
mod user_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use container::Services;

pub use account_service::{AccountManager, AccountService};
pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use transfer_service::{TransferEngine, TransferService};
pub use user_service::{UserManager, UserService};
