//! Domain layer - Core business entities and rules
//!
//! Accounts, users, password hashing and the transfer rules. Nothing in
//! here touches the database or HTTP.

pub mod account;
pub mod password;
pub mod transfer;
pub mod user;

pub use account::{
    generate_account_number, validate_money, Account, AccountChanges, AccountResponse, NewAccount,
};
pub use password::Password;
pub use transfer::{validate_amount, TransferError, TransferIntent};
pub use user::{User, UserDetails, UserResponse};
