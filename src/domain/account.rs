//! Account domain entity, request types and account-number generation.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::config::{ACCOUNT_NUMBER_MAX, ACCOUNT_NUMBER_MIN, MONEY_PRECISION, MONEY_SCALE};

/// Account domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i32,
    pub user_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub hobby: Option<String>,
    pub age: Option<i32>,
    pub account_number: i64,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Check whether `user_id` owns this account
    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.user_id == user_id
    }
}

/// Account creation request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewAccount {
    #[validate(length(min = 1, max = 255, message = "First name is required"))]
    #[schema(example = "Ada")]
    pub first_name: String,
    #[validate(length(min = 1, max = 255, message = "Last name is required"))]
    #[schema(example = "Lovelace")]
    pub last_name: String,
    #[validate(length(max = 255, message = "Hobby is too long"))]
    #[schema(example = "Chess")]
    pub hobby: Option<String>,
    #[validate(range(min = 0, max = 150, message = "Age must be between 0 and 150"))]
    #[schema(example = 36)]
    pub age: Option<i32>,
    /// Opening balance
    #[serde(default)]
    #[schema(value_type = String, example = "500.00")]
    pub balance: Decimal,
}

/// Partial account update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct AccountChanges {
    #[validate(length(min = 1, max = 255, message = "First name cannot be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,
    #[validate(length(max = 255, message = "Hobby is too long"))]
    pub hobby: Option<String>,
    #[validate(range(min = 0, max = 150, message = "Age must be between 0 and 150"))]
    pub age: Option<i32>,
    #[schema(value_type = Option<String>, example = "250.00")]
    pub balance: Option<Decimal>,
}

impl AccountChanges {
    /// True if the request changes nothing
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.hobby.is_none()
            && self.age.is_none()
            && self.balance.is_none()
    }
}

/// Account response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccountResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = 1)]
    pub user_id: i32,
    #[schema(example = "Ada")]
    pub first_name: String,
    #[schema(example = "Lovelace")]
    pub last_name: String,
    pub hobby: Option<String>,
    pub age: Option<i32>,
    #[schema(example = 4821937465_i64)]
    pub account_number: i64,
    #[schema(value_type = String, example = "500.00")]
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            user_id: account.user_id,
            first_name: account.first_name,
            last_name: account.last_name,
            hobby: account.hobby,
            age: account.age,
            account_number: account.account_number,
            balance: account.balance,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Draw a 10-digit account number from the OS RNG.
///
/// Uniqueness is not guaranteed here; callers redraw when the number is
/// taken and the UNIQUE index rejects anything that slips through.
pub fn generate_account_number() -> i64 {
    let span = (ACCOUNT_NUMBER_MAX - ACCOUNT_NUMBER_MIN + 1) as u64;
    ACCOUNT_NUMBER_MIN + (OsRng.next_u64() % span) as i64
}

/// Check that `value` fits the `DECIMAL(15, 2)` balance column and is not
/// negative.
pub fn validate_money(value: Decimal) -> Result<(), String> {
    let integer_digits = MONEY_PRECISION - MONEY_SCALE;
    let ceiling = Decimal::from(10_i64.pow(integer_digits));

    if value.is_sign_negative() && !value.is_zero() {
        return Err("Amount cannot be negative".to_string());
    }
    if value.normalize().scale() > MONEY_SCALE {
        return Err(format!(
            "Amount cannot have more than {} decimal places",
            MONEY_SCALE
        ));
    }
    if value >= ceiling {
        return Err("Amount is too large".to_string());
    }
    Ok(())
}
