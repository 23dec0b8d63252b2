//! Transaction records
//!
//! A transaction is the immutable receipt of exactly one balance delta.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::account::{AccountNumber, AppliedDelta};
use super::amount::{Amount, Balance};

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Credit,
    Debit,
}

impl TransactionType {
    /// Signed balance delta for the given amount
    pub fn delta(&self, amount: &Amount) -> i64 {
        match self {
            Self::Credit => amount.value(),
            Self::Debit => -amount.value(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            other => Err(format!("unknown transaction type: {}", other)),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored transaction receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: i64,
    pub account_number: AccountNumber,
    pub amount: Amount,
    /// Id of the authenticated actor who performed the transaction
    pub cashier: i64,
    pub transaction_type: TransactionType,
    pub old_balance: Balance,
    pub account_balance: Balance,
    /// Account version right after this transaction was applied
    #[serde(skip)]
    pub version: i64,
    pub created_on: DateTime<Utc>,
}

/// Transaction fields known before the store assigns an id
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_number: AccountNumber,
    pub amount: Amount,
    pub cashier: i64,
    pub transaction_type: TransactionType,
    pub old_balance: Balance,
    pub account_balance: Balance,
    pub version: i64,
}

impl NewTransaction {
    /// Describe a committed delta
    pub fn from_applied(
        applied: &AppliedDelta,
        amount: Amount,
        cashier: i64,
        transaction_type: TransactionType,
    ) -> Self {
        Self {
            account_number: applied.account_number,
            amount,
            cashier,
            transaction_type,
            old_balance: applied.old_balance,
            account_balance: applied.new_balance,
            version: applied.version,
        }
    }

    pub fn into_transaction(self, transaction_id: i64, created_on: DateTime<Utc>) -> Transaction {
        Transaction {
            transaction_id,
            account_number: self.account_number,
            amount: self.amount,
            cashier: self.cashier,
            transaction_type: self.transaction_type,
            old_balance: self.old_balance,
            account_balance: self.account_balance,
            version: self.version,
            created_on,
        }
    }
}
