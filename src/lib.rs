//! Ledger API - account management and balance transfers over REST.
//!
//! Users sign up and log in (Argon2 password hashes, JWT bearer tokens),
//! own a single bank account each, and move funds between accounts with
//! an atomic, row-locked transfer.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Accounts, users, passwords and the transfer rules
//! - **services**: Use cases, including the transfer engine
//! - **infra**: Database, migrations, repositories, ledger backends
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared response and pagination types
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Account, Password, TransferError, User};
pub use errors::{AppError, AppResult};
pub use infra::{InMemoryLedger, Ledger, LedgerTransaction};
pub use services::{TransferEngine, TransferService};
