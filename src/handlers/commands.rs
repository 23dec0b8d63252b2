//! Command definitions
//!
//! Commands represent intentions to change the system state. Fields arrive
//! unvalidated; handlers validate them in a fixed order.

use axum::body::Bytes;
use serde::{Deserialize, Serialize};

use crate::domain::{AccountNumber, AccountStatus, AccountType, TransactionType};

// =========================================================================
// Users
// =========================================================================

/// Command to register a client
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupCommand {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl SignupCommand {
    pub fn new(first_name: &str, last_name: &str, email: &str, password: &str) -> Self {
        Self {
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            confirm_password: Some(password.to_string()),
        }
    }

    pub fn with_confirm_password(mut self, confirm_password: &str) -> Self {
        self.confirm_password = Some(confirm_password.to_string());
        self
    }
}

/// Command to sign in
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SigninCommand {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl SigninCommand {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }
}

/// Result of a successful signup or signin
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResult {
    pub token: String,
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

// =========================================================================
// Accounts
// =========================================================================

/// Command to open an account for the caller
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountCommand {
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    pub opening_balance: Option<i64>,
}

impl CreateAccountCommand {
    pub fn new(account_type: AccountType) -> Self {
        Self {
            account_type: Some(account_type.as_str().to_string()),
            opening_balance: None,
        }
    }

    pub fn with_opening_balance(mut self, opening_balance: i64) -> Self {
        self.opening_balance = Some(opening_balance);
        self
    }
}

/// Result of a successful account creation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountResult {
    pub account_number: AccountNumber,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub opening_balance: i64,
    pub status: AccountStatus,
}

/// Command to activate or deactivate an account
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeStatusCommand {
    pub status: Option<String>,
}

impl ChangeStatusCommand {
    pub fn new(status: AccountStatus) -> Self {
        Self {
            status: Some(status.as_str().to_string()),
        }
    }
}

/// Result of a status change
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusResult {
    pub account_number: AccountNumber,
    pub status: AccountStatus,
}

/// Result of a deletion
#[derive(Debug, Clone, Serialize)]
pub struct DeleteAccountResult {
    pub message: String,
}

// =========================================================================
// Transactions
// =========================================================================

/// Command to credit or debit an account.
///
/// The account number is the raw path segment and the body is the raw
/// request body; both are validated by the processor after authentication.
#[derive(Debug, Clone)]
pub struct TransactionCommand {
    pub account_number: String,
    pub body: Bytes,
    pub transaction_type: TransactionType,
}

impl TransactionCommand {
    pub fn new(account_number: impl Into<String>, body: impl Into<Bytes>, transaction_type: TransactionType) -> Self {
        Self {
            account_number: account_number.into(),
            body: body.into(),
            transaction_type,
        }
    }

    pub fn credit(account_number: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self::new(account_number, body, TransactionType::Credit)
    }

    pub fn debit(account_number: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self::new(account_number, body, TransactionType::Debit)
    }
}
