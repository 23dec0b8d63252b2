//! Store module
//!
//! Storage traits injected into handlers, with an in-memory and a PostgreSQL
//! backend. `AccountStore::apply_and_record` is the only place that mutates a
//! balance and the only place holding per-account exclusivity.

pub mod error;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::{
    Account, AccountNumber, AccountStatus, Amount, NewAccount, NewUser, Transaction,
    TransactionType, User,
};

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account; fails with `Duplicate` if the number is taken
    async fn create_account(&self, account: NewAccount) -> StoreResult<Account>;

    /// Fetch a live (not deleted) account
    async fn get_account(&self, account_number: AccountNumber) -> StoreResult<Account>;

    /// Apply a credit or debit and record its receipt as one atomic step.
    ///
    /// Concurrent calls on the same account are serialized. The account must
    /// be live and active. A debit that would make the balance negative fails
    /// with `DomainError::InsufficientFunds`; on any failure neither the
    /// balance nor the log changes.
    async fn apply_and_record(
        &self,
        account_number: AccountNumber,
        amount: Amount,
        transaction_type: TransactionType,
        cashier: i64,
    ) -> StoreResult<Transaction>;

    async fn set_status(
        &self,
        account_number: AccountNumber,
        status: AccountStatus,
    ) -> StoreResult<Account>;

    /// Flag the account as deleted; it is never physically removed
    async fn mark_deleted(&self, account_number: AccountNumber) -> StoreResult<Account>;
}

#[async_trait]
pub trait TransactionLog: Send + Sync {
    /// Receipts for an account ordered by account version
    async fn transactions_for(&self, account_number: AccountNumber) -> StoreResult<Vec<Transaction>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; fails with `Duplicate` if the email is taken
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;

    /// Case-insensitive lookup
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>>;
}

/// Everything the API needs from a backend
pub trait Store: AccountStore + TransactionLog + UserStore {}

impl<T> Store for T where T: AccountStore + TransactionLog + UserStore {}
