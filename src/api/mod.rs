//! HTTP surface: signup and login, account CRUD, transfers, health and
//! the OpenAPI document. Everything under `/user` and `/accounts` sits
//! behind the bearer-token middleware.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
