//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

use super::amount::AmountError;
use super::AccountNumber;

/// Domain-specific errors
///
/// These errors represent business rule violations and domain invariant failures.
/// They are independent of the web/infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Debit larger than the current balance
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },

    /// Account is dormant and cannot process transactions
    #[error("Account {0} is not active")]
    AccountNotActive(AccountNumber),

    /// Amount or balance rule violated
    #[error(transparent)]
    InvalidAmount(#[from] AmountError),
}

impl DomainError {
    /// Create an insufficient funds error
    pub fn insufficient_funds(required: i64, available: i64) -> Self {
        Self::InsufficientFunds { required, available }
    }
}
