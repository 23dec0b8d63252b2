//! Domain module
//!
//! Core domain types and business logic.

pub mod account;
pub mod amount;
pub mod context;
pub mod error;
pub mod identity;
pub mod transaction;

pub use account::{
    generate_account_number, Account, AccountNumber, AccountStatus, AccountType, AppliedDelta,
    NewAccount,
};
pub use amount::{Amount, AmountError, Balance};
pub use context::OperationContext;
pub use error::DomainError;
pub use identity::{Identity, NewUser, Role, User};
pub use transaction::{NewTransaction, Transaction, TransactionType};
