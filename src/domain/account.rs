//! Bank account
//!
//! Account records and the balance mutation rule. The store decides how the
//! mutation is serialized; the rule itself lives here.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::amount::Balance;
use super::error::DomainError;

/// Account numbers are plain integers on the wire and in storage.
pub type AccountNumber = i64;

const ACCOUNT_NUMBER_MIN: AccountNumber = 1_000_000_000;
const ACCOUNT_NUMBER_MAX: AccountNumber = 9_999_999_999;

/// Generate a random 10-digit account number.
pub fn generate_account_number() -> AccountNumber {
    rand::thread_rng().gen_range(ACCOUNT_NUMBER_MIN..=ACCOUNT_NUMBER_MAX)
}

/// Kind of account a client can open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Savings,
    Current,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Savings => "savings",
            Self::Current => "current",
        }
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "savings" => Ok(Self::Savings),
            "current" => Ok(Self::Current),
            other => Err(format!("unknown account type: {}", other)),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Dormant,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Dormant => "dormant",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "dormant" => Ok(Self::Dormant),
            other => Err(format!("unknown account status: {}", other)),
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bank account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_number: AccountNumber,
    pub owner_id: i64,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub balance: Balance,
    pub status: AccountStatus,
    /// Number of balance mutations applied since creation
    pub version: i64,
    pub created_on: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_on: Option<DateTime<Utc>>,
}

/// Outcome of a single committed balance delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedDelta {
    pub account_number: AccountNumber,
    pub old_balance: Balance,
    pub new_balance: Balance,
    pub version: i64,
}

/// Fields required to open an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub account_number: AccountNumber,
    pub owner_id: i64,
    pub account_type: AccountType,
    pub opening_balance: Balance,
}

impl Account {
    /// Build a fresh account from creation fields
    pub fn open(new: NewAccount) -> Self {
        Self {
            account_number: new.account_number,
            owner_id: new.owner_id,
            account_type: new.account_type,
            balance: new.opening_balance,
            status: AccountStatus::Active,
            version: 0,
            created_on: Utc::now(),
            deleted_on: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_on.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// Apply a signed delta to the balance.
    ///
    /// Fails without touching the account if the result would be negative.
    pub fn apply_delta(&mut self, delta: i64) -> Result<AppliedDelta, DomainError> {
        let old_balance = self.balance;
        let new_balance = match old_balance.apply(delta) {
            Ok(balance) => balance,
            Err(super::AmountError::Negative(_)) => {
                return Err(DomainError::insufficient_funds(-delta, old_balance.value()));
            }
            Err(e) => return Err(e.into()),
        };

        self.balance = new_balance;
        self.version += 1;

        Ok(AppliedDelta {
            account_number: self.account_number,
            old_balance,
            new_balance,
            version: self.version,
        })
    }
}
