//! HTTP-level tests for the router.
//!
//! Auth, user and account services are hand-written fakes; transfers run
//! through the real `TransferEngine` over an `InMemoryLedger`, so the
//! status mapping is exercised end to end without a database.

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;

use ledger_api::api::create_router;
use ledger_api::domain::{Account, AccountChanges, NewAccount, User, UserDetails};
use ledger_api::errors::{AppError, AppResult};
use ledger_api::infra::{Database, InMemoryLedger};
use ledger_api::services::{
    AccountService, AuthService, Claims, Services, TokenResponse, TransferEngine, UserService,
};
use ledger_api::types::{Paginated, PaginationParams};
use ledger_api::AppState;

const ALICE: i32 = 1;
const BOB: i32 = 2;
const CAROL: i32 = 3; // has no account
const ALICE_ACCOUNT: i64 = 4_000_000_001;
const BOB_ACCOUNT: i64 = 4_000_000_002;

// =============================================================================
// Fake services
// =============================================================================

fn user(id: i32, username: &str) -> User {
    User {
        id,
        username: username.to_string(),
        password_hash: "hashed".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Accepts `token-<user id>` bearer tokens.
struct FakeAuthService;

#[async_trait]
impl AuthService for FakeAuthService {
    async fn register(&self, username: String, _password: String) -> AppResult<User> {
        if username == "alice" {
            return Err(AppError::conflict("Username"));
        }
        Ok(user(10, &username))
    }

    async fn login(&self, username: String, password: String) -> AppResult<TokenResponse> {
        if username == "alice" && password == "correct horse" {
            Ok(TokenResponse {
                access_token: format!("token-{}", ALICE),
                token_type: "Bearer".to_string(),
                expires_in: 86_400,
            })
        } else {
            Err(AppError::InvalidCredentials)
        }
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let id = token
            .strip_prefix("token-")
            .and_then(|id| id.parse::<i32>().ok())
            .ok_or(AppError::Unauthorized)?;

        Ok(Claims {
            sub: id,
            username: format!("user{}", id),
            exp: Utc::now().timestamp() + 3600,
            iat: Utc::now().timestamp(),
        })
    }
}

struct FakeAccountService {
    accounts: Mutex<Vec<Account>>,
}

impl FakeAccountService {
    fn new() -> Self {
        Self {
            accounts: Mutex::new(vec![
                account(1, ALICE, ALICE_ACCOUNT),
                account(2, BOB, BOB_ACCOUNT),
            ]),
        }
    }

    fn owned(&self, user_id: i32, id: i32) -> AppResult<Account> {
        let accounts = self.accounts.lock().unwrap();
        let account = accounts
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(AppError::NotFound)?;
        if !account.is_owned_by(user_id) {
            return Err(AppError::Forbidden);
        }
        Ok(account)
    }
}

fn account(id: i32, user_id: i32, account_number: i64) -> Account {
    Account {
        id,
        user_id,
        first_name: "First".to_string(),
        last_name: "Last".to_string(),
        hobby: None,
        age: None,
        account_number,
        balance: Decimal::ZERO,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[async_trait]
impl AccountService for FakeAccountService {
    async fn create_account(&self, user_id: i32, new: NewAccount) -> AppResult<Account> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|a| a.user_id == user_id) {
            return Err(AppError::conflict("Account"));
        }
        let mut created = account(accounts.len() as i32 + 1, user_id, 4_000_000_100);
        created.first_name = new.first_name;
        created.last_name = new.last_name;
        created.balance = new.balance;
        accounts.push(created.clone());
        Ok(created)
    }

    async fn list_accounts(&self, params: PaginationParams) -> AppResult<Paginated<Account>> {
        let accounts = self.accounts.lock().unwrap().clone();
        let total = accounts.len() as u64;
        Ok(Paginated::new(accounts, params.normalized(), total))
    }

    async fn get_account(&self, user_id: i32, id: i32) -> AppResult<Account> {
        self.owned(user_id, id)
    }

    async fn update_account(
        &self,
        user_id: i32,
        id: i32,
        changes: AccountChanges,
    ) -> AppResult<Account> {
        let mut account = self.owned(user_id, id)?;
        if let Some(hobby) = changes.hobby {
            account.hobby = Some(hobby);
        }
        Ok(account)
    }

    async fn delete_account(&self, user_id: i32, id: i32) -> AppResult<()> {
        self.owned(user_id, id)?;
        self.accounts.lock().unwrap().retain(|a| a.id != id);
        Ok(())
    }

    async fn account_of(&self, user_id: i32) -> AppResult<Option<Account>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.user_id == user_id)
            .cloned())
    }
}

struct FakeUserService;

#[async_trait]
impl UserService for FakeUserService {
    async fn get_details(&self, user_id: i32) -> AppResult<UserDetails> {
        Ok(UserDetails::new(
            user(user_id, "alice"),
            vec![account(1, user_id, ALICE_ACCOUNT)],
        ))
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Router plus a handle on the ledger behind it.
fn test_app(alice_balance: &str, bob_balance: &str) -> (Router, InMemoryLedger) {
    let ledger = InMemoryLedger::with_accounts([
        (ALICE_ACCOUNT, dec(alice_balance)),
        (BOB_ACCOUNT, dec(bob_balance)),
    ]);

    let services = Services::new(
        Arc::new(FakeAuthService),
        Arc::new(FakeUserService),
        Arc::new(FakeAccountService::new()),
        Arc::new(TransferEngine::new(ledger.clone())),
    );
    let database = Arc::new(Database::from_connection(DatabaseConnection::default()));

    (create_router(AppState::new(services, database)), ledger)
}

fn request(method: Method, uri: &str, user_id: Option<i32>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = user_id {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer token-{}", id));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn transfer(app: Router, user_id: i32, body: Value) -> (StatusCode, Value) {
    send(
        app,
        request(Method::POST, "/accounts/transfer", Some(user_id), Some(body)),
    )
    .await
}

// =============================================================================
// Transfer endpoint
// =============================================================================

#[tokio::test]
async fn test_transfer_success() {
    let (app, ledger) = test_app("500.00", "20.00");

    let (status, body) = transfer(
        app,
        ALICE,
        json!({"to_account_id": BOB_ACCOUNT, "amount": "150.00"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Balance transferred successfully"}));
    assert_eq!(ledger.balance(ALICE_ACCOUNT).await, Some(dec("350.00")));
    assert_eq!(ledger.balance(BOB_ACCOUNT).await, Some(dec("170.00")));
}

#[tokio::test]
async fn test_transfer_with_matching_source_number() {
    let (app, ledger) = test_app("500.00", "20.00");

    let (status, _) = transfer(
        app,
        ALICE,
        json!({"from_account_number": ALICE_ACCOUNT, "to_account_id": BOB_ACCOUNT, "amount": "1.00"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ledger.balance(ALICE_ACCOUNT).await, Some(dec("499.00")));
}

#[tokio::test]
async fn test_transfer_from_foreign_account_is_forbidden() {
    let (app, ledger) = test_app("500.00", "20.00");

    let (status, body) = transfer(
        app,
        ALICE,
        json!({"from_account_number": BOB_ACCOUNT, "to_account_id": ALICE_ACCOUNT, "amount": "1.00"}),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
    assert_eq!(ledger.transactions_started(), 0);
}

#[tokio::test]
async fn test_transfer_insufficient_balance() {
    let (app, ledger) = test_app("100.00", "20.00");

    let (status, body) = transfer(
        app,
        ALICE,
        json!({"to_account_id": BOB_ACCOUNT, "amount": "150.00"}),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "INSUFFICIENT_BALANCE");
    assert_eq!(ledger.balance(ALICE_ACCOUNT).await, Some(dec("100.00")));
}

#[tokio::test]
async fn test_transfer_invalid_amount() {
    let (app, ledger) = test_app("100.00", "20.00");

    let (status, body) = transfer(
        app,
        ALICE,
        json!({"to_account_id": BOB_ACCOUNT, "amount": "-5.00"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_AMOUNT");
    assert_eq!(ledger.transactions_started(), 0);
}

#[tokio::test]
async fn test_invalid_amount_wins_over_missing_source_account() {
    let (app, _) = test_app("100.00", "20.00");

    let (status, body) = transfer(
        app,
        CAROL,
        json!({"to_account_id": BOB_ACCOUNT, "amount": "0"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_AMOUNT");
}

#[tokio::test]
async fn test_transfer_to_unknown_account() {
    let (app, _) = test_app("100.00", "20.00");

    let (status, body) = transfer(
        app,
        ALICE,
        json!({"to_account_id": 1_111_111_111_i64, "amount": "5.00"}),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "ACCOUNTS_NOT_FOUND");
}

#[tokio::test]
async fn test_transfer_without_own_account() {
    let (app, _) = test_app("100.00", "20.00");

    let (status, body) = transfer(
        app,
        CAROL,
        json!({"to_account_id": BOB_ACCOUNT, "amount": "5.00"}),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "ACCOUNTS_NOT_FOUND");
}

#[tokio::test]
async fn test_transfer_to_self() {
    let (app, _) = test_app("100.00", "20.00");

    let (status, body) = transfer(
        app,
        ALICE,
        json!({"to_account_id": ALICE_ACCOUNT, "amount": "5.00"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "SAME_ACCOUNT");
}

#[tokio::test]
async fn test_transfer_requires_token() {
    let (app, _) = test_app("100.00", "20.00");

    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/accounts/transfer",
            None,
            Some(json!({"to_account_id": BOB_ACCOUNT, "amount": "5.00"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_transfer_malformed_body() {
    let (app, _) = test_app("100.00", "20.00");

    let (status, body) = transfer(app, ALICE, json!({"amount": "5.00"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_signup_returns_created_user() {
    let (app, _) = test_app("0", "0");

    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/users/signup",
            None,
            Some(json!({"username": "dave", "password": "long enough"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "dave");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_signup_validates_input() {
    let (app, _) = test_app("0", "0");

    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/users/signup",
            None,
            Some(json!({"username": "dave", "password": "short"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        "Password must be at least 8 characters"
    );
}

#[tokio::test]
async fn test_signup_duplicate_username() {
    let (app, _) = test_app("0", "0");

    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/users/signup",
            None,
            Some(json!({"username": "alice", "password": "long enough"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["message"], "Username already exists");
}

#[tokio::test]
async fn test_login_success_and_failure() {
    let (app, _) = test_app("0", "0");

    let (status, body) = send(
        app.clone(),
        request(
            Method::POST,
            "/users/login",
            None,
            Some(json!({"username": "alice", "password": "correct horse"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");

    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/users/login",
            None,
            Some(json!({"username": "alice", "password": "wrong"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_user_details() {
    let (app, _) = test_app("0", "0");

    let (status, body) = send(app, request(Method::GET, "/user/details", Some(ALICE), None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], ALICE);
    assert_eq!(body["accounts"][0]["account_number"], ALICE_ACCOUNT);
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn test_list_accounts_is_paginated() {
    let (app, _) = test_app("0", "0");

    let (status, body) = send(
        app,
        request(Method::GET, "/accounts?page=1&per_page=10", Some(ALICE), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["meta"]["total"], 2);
    assert_eq!(body["meta"]["per_page"], 10);
}

#[tokio::test]
async fn test_create_account_for_caller() {
    let (app, _) = test_app("0", "0");

    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/accounts",
            Some(CAROL),
            Some(json!({"first_name": "Carol", "last_name": "Shaw", "balance": "25.50"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user_id"], CAROL);
    assert_eq!(body["balance"], "25.50");
}

#[tokio::test]
async fn test_second_account_conflicts() {
    let (app, _) = test_app("0", "0");

    let (status, _) = send(
        app,
        request(
            Method::POST,
            "/accounts",
            Some(ALICE),
            Some(json!({"first_name": "Alice", "last_name": "Liddell"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_account_access_is_owner_only() {
    let (app, _) = test_app("0", "0");

    let (own, _) = send(app.clone(), request(Method::GET, "/accounts/1", Some(ALICE), None)).await;
    let (foreign, _) = send(app.clone(), request(Method::GET, "/accounts/2", Some(ALICE), None)).await;
    let (missing, _) = send(app, request(Method::GET, "/accounts/99", Some(ALICE), None)).await;

    assert_eq!(own, StatusCode::OK);
    assert_eq!(foreign, StatusCode::FORBIDDEN);
    assert_eq!(missing, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patch_account() {
    let (app, _) = test_app("0", "0");

    let (status, body) = send(
        app,
        request(
            Method::PATCH,
            "/accounts/1",
            Some(ALICE),
            Some(json!({"hobby": "Chess"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hobby"], "Chess");
}

#[tokio::test]
async fn test_delete_account() {
    let (app, _) = test_app("0", "0");

    let (deleted, _) = send(app.clone(), request(Method::DELETE, "/accounts/1", Some(ALICE), None)).await;
    let (again, _) = send(app, request(Method::GET, "/accounts/1", Some(ALICE), None)).await;

    assert_eq!(deleted, StatusCode::NO_CONTENT);
    assert_eq!(again, StatusCode::NOT_FOUND);
}

// =============================================================================
// Infrastructure endpoints
// =============================================================================

#[tokio::test]
async fn test_root_banner() {
    let (app, _) = test_app("0", "0");

    let response = app
        .oneshot(request(Method::GET, "/", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_reports_degraded_without_database() {
    let (app, _) = test_app("0", "0");

    let (status, body) = send(app, request(Method::GET, "/health", None, None)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["services"]["database"]["status"], "unhealthy");
    assert_eq!(body["services"]["database"]["error"], "database unavailable");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (app, _) = test_app("0", "0");

    let (status, body) = send(app, request(Method::GET, "/api-docs/openapi.json", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/accounts/transfer"].is_object());
}
