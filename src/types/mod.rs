//! Shared request and response types.

mod pagination;
mod response;

pub use pagination::{PaginatedAccounts, Paginated, PaginationMeta, PaginationParams};
pub use response::{Created, MessageResponse, NoContent};
