//! Account CRUD and transfer handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{validate_amount, AccountChanges, AccountResponse, NewAccount, TransferError};
use crate::errors::{AppError, AppResult};
use crate::types::{Created, MessageResponse, NoContent, Paginated, PaginationParams};

/// Transfer request.
///
/// `to_account_id` carries the destination account *number*.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TransferRequest {
    /// Caller's account number; must match the caller's account when given
    #[schema(example = 4821937465_i64)]
    pub from_account_number: Option<i64>,
    /// Destination account number
    #[schema(example = 7310284956_i64)]
    pub to_account_id: i64,
    #[schema(value_type = String, example = "150.00")]
    pub amount: Decimal,
}

/// Create protected account routes
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_accounts).post(create_account))
        .route("/transfer", post(transfer))
        .route(
            "/:id",
            get(get_account).patch(update_account).delete(delete_account),
        )
}

/// Open the caller's account
#[utoipa::path(
    post,
    path = "/accounts",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    request_body = NewAccount,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Caller already has an account")
    )
)]
pub async fn create_account(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<NewAccount>,
) -> AppResult<Created<AccountResponse>> {
    let account = state
        .account_service
        .create_account(current_user.id, payload)
        .await?;

    Ok(Created(AccountResponse::from(account)))
}

/// List accounts, one page at a time
#[utoipa::path(
    get,
    path = "/accounts",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "A page of accounts", body = crate::types::PaginatedAccounts),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_accounts(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<AccountResponse>>> {
    let page = state.account_service.list_accounts(params).await?;
    Ok(Json(page.map(AccountResponse::from)))
}

/// Get one of the caller's accounts
#[utoipa::path(
    get,
    path = "/accounts/{id}",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account", body = AccountResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Account belongs to another user"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn get_account(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<AccountResponse>> {
    let account = state.account_service.get_account(current_user.id, id).await?;
    Ok(Json(AccountResponse::from(account)))
}

/// Update fields of one of the caller's accounts
#[utoipa::path(
    patch,
    path = "/accounts/{id}",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Account ID")),
    request_body = AccountChanges,
    responses(
        (status = 200, description = "Updated account", body = AccountResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Account belongs to another user"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn update_account(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<AccountChanges>,
) -> AppResult<Json<AccountResponse>> {
    let account = state
        .account_service
        .update_account(current_user.id, id, payload)
        .await?;

    Ok(Json(AccountResponse::from(account)))
}

/// Delete one of the caller's accounts
#[utoipa::path(
    delete,
    path = "/accounts/{id}",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Account ID")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Account belongs to another user"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn delete_account(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<NoContent> {
    state
        .account_service
        .delete_account(current_user.id, id)
        .await?;

    Ok(NoContent)
}

/// Move funds from the caller's account to another account
#[utoipa::path(
    post,
    path = "/accounts/transfer",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Transfer committed", body = MessageResponse),
        (status = 400, description = "INVALID_AMOUNT or SAME_ACCOUNT"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "from_account_number is not the caller's account"),
        (status = 404, description = "ACCOUNTS_NOT_FOUND"),
        (status = 422, description = "INSUFFICIENT_BALANCE"),
        (status = 500, description = "TRANSACTION_FAILURE")
    )
)]
pub async fn transfer(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<TransferRequest>,
) -> AppResult<Json<MessageResponse>> {
    validate_amount(payload.amount)?;

    let source = state
        .account_service
        .account_of(current_user.id)
        .await?
        .ok_or(TransferError::AccountsNotFound)?;

    if let Some(claimed) = payload.from_account_number {
        if claimed != source.account_number {
            tracing::warn!(
                user_id = current_user.id,
                claimed,
                "Transfer from an account the caller does not own"
            );
            return Err(AppError::Forbidden);
        }
    }

    state
        .transfer_service
        .transfer(source.account_number, payload.to_account_id, payload.amount)
        .await?;

    Ok(Json(MessageResponse::new("Balance transferred successfully")))
}
