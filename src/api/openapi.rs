//! OpenAPI documentation configuration.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{account_handler, auth_handler, user_handler};
use crate::domain::{AccountChanges, AccountResponse, NewAccount, UserDetails, UserResponse};
use crate::services::TokenResponse;
use crate::types::{MessageResponse, PaginatedAccounts, PaginationMeta};

/// OpenAPI document served at `/api-docs/openapi.json`
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ledger API",
        version = "0.1.0",
        description = "User accounts and atomic balance transfers",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        auth_handler::signup,
        auth_handler::login,
        user_handler::get_details,
        account_handler::create_account,
        account_handler::list_accounts,
        account_handler::get_account,
        account_handler::update_account,
        account_handler::delete_account,
        account_handler::transfer,
    ),
    components(
        schemas(
            UserResponse,
            UserDetails,
            AccountResponse,
            NewAccount,
            AccountChanges,
            PaginatedAccounts,
            PaginationMeta,
            MessageResponse,
            TokenResponse,
            auth_handler::SignupRequest,
            auth_handler::LoginRequest,
            account_handler::TransferRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Signup and login"),
        (name = "Users", description = "Current user profile"),
        (name = "Accounts", description = "Account management and transfers")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT obtained from /users/login"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/users/signup",
            "/users/login",
            "/user/details",
            "/accounts",
            "/accounts/{id}",
            "/accounts/transfer",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_document_carries_schema_examples() {
        let json: serde_json::Value =
            serde_json::from_str(&ApiDoc::openapi().to_json().unwrap()).unwrap();
        let schemas = &json["components"]["schemas"];

        assert_eq!(
            schemas["TransferRequest"]["properties"]["amount"]["example"],
            "150.00"
        );
        assert!(schemas["PaginatedAccounts"].is_object());
    }
}
