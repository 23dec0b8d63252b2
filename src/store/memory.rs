//! In-memory store
//!
//! Default backend when no database is configured. Each account sits behind
//! its own mutex so unrelated accounts never contend; the account table lock
//! is only held to insert or look up the per-account handle. A balance change
//! and its receipt are written while the account mutex is held, and the
//! account is only updated once the receipt is in the log.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};

use crate::domain::{
    Account, AccountNumber, AccountStatus, Amount, DomainError, NewAccount, NewTransaction,
    NewUser, Transaction, TransactionType, User,
};

use super::{AccountStore, StoreError, StoreResult, TransactionLog, UserStore};

#[derive(Default, Debug)]
struct Users {
    by_id: HashMap<i64, User>,
    by_email: HashMap<String, i64>,
}

#[derive(Default, Debug)]
struct Data {
    accounts: RwLock<HashMap<AccountNumber, Arc<Mutex<Account>>>>,
    transactions: RwLock<HashMap<AccountNumber, Vec<Transaction>>>,
    users: RwLock<Users>,
    last_user_id: AtomicI64,
    last_transaction_id: AtomicI64,
}

#[derive(Default, Clone, Debug)]
pub struct MemoryStore {
    data: Arc<Data>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn account_handle(&self, account_number: AccountNumber) -> StoreResult<Arc<Mutex<Account>>> {
        self.data
            .accounts
            .read()
            .await
            .get(&account_number)
            .cloned()
            .ok_or_else(|| StoreError::account_not_found(account_number))
    }

    /// Lock a live account and run `f` on it
    async fn with_account<T>(
        &self,
        account_number: AccountNumber,
        f: impl FnOnce(&mut Account) -> StoreResult<T> + Send,
    ) -> StoreResult<T> {
        let handle = self.account_handle(account_number).await?;
        let mut account = handle.lock().await;
        if account.is_deleted() {
            return Err(StoreError::account_not_found(account_number));
        }
        f(&mut account)
    }

    /// Insert a receipt in version order; a version can only be recorded once
    async fn record(&self, transaction: Transaction) -> StoreResult<()> {
        let mut log = self.data.transactions.write().await;
        let entries = log.entry(transaction.account_number).or_default();
        let position = entries.partition_point(|t| t.version < transaction.version);
        if entries
            .get(position)
            .is_some_and(|t| t.version == transaction.version)
        {
            return Err(StoreError::Corrupt(format!(
                "receipt for account {} version {} already recorded",
                transaction.account_number, transaction.version
            )));
        }
        entries.insert(position, transaction);
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_account(&self, new: NewAccount) -> StoreResult<Account> {
        let mut accounts = self.data.accounts.write().await;
        if accounts.contains_key(&new.account_number) {
            return Err(StoreError::Duplicate {
                entity: "Account",
                key: new.account_number.to_string(),
            });
        }

        let account = Account::open(new);
        accounts.insert(account.account_number, Arc::new(Mutex::new(account.clone())));
        Ok(account)
    }

    async fn get_account(&self, account_number: AccountNumber) -> StoreResult<Account> {
        self.with_account(account_number, |account| Ok(account.clone()))
            .await
    }

    async fn apply_and_record(
        &self,
        account_number: AccountNumber,
        amount: Amount,
        transaction_type: TransactionType,
        cashier: i64,
    ) -> StoreResult<Transaction> {
        let handle = self.account_handle(account_number).await?;
        let mut account = handle.lock().await;
        if account.is_deleted() {
            return Err(StoreError::account_not_found(account_number));
        }
        if !account.is_active() {
            return Err(DomainError::AccountNotActive(account_number).into());
        }

        let mut updated = account.clone();
        let applied = updated.apply_delta(transaction_type.delta(&amount))?;

        let id = self.data.last_transaction_id.fetch_add(1, Ordering::SeqCst) + 1;
        let transaction = NewTransaction::from_applied(&applied, amount, cashier, transaction_type)
            .into_transaction(id, Utc::now());

        self.record(transaction.clone()).await?;
        *account = updated;

        Ok(transaction)
    }

    async fn set_status(
        &self,
        account_number: AccountNumber,
        status: AccountStatus,
    ) -> StoreResult<Account> {
        self.with_account(account_number, |account| {
            account.status = status;
            Ok(account.clone())
        })
        .await
    }

    async fn mark_deleted(&self, account_number: AccountNumber) -> StoreResult<Account> {
        self.with_account(account_number, |account| {
            account.deleted_on = Some(Utc::now());
            Ok(account.clone())
        })
        .await
    }
}

#[async_trait]
impl TransactionLog for MemoryStore {
    async fn transactions_for(&self, account_number: AccountNumber) -> StoreResult<Vec<Transaction>> {
        Ok(self
            .data
            .transactions
            .read()
            .await
            .get(&account_number)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, new: NewUser) -> StoreResult<User> {
        let email_key = new.email.to_lowercase();
        let mut users = self.data.users.write().await;
        if users.by_email.contains_key(&email_key) {
            return Err(StoreError::Duplicate {
                entity: "User",
                key: new.email,
            });
        }

        let id = self.data.last_user_id.fetch_add(1, Ordering::SeqCst) + 1;
        let user = new.into_user(id, Utc::now());
        users.by_email.insert(email_key, id);
        users.by_id.insert(id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.data.users.read().await;
        Ok(users
            .by_email
            .get(&email.to_lowercase())
            .and_then(|id| users.by_id.get(id))
            .cloned())
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.data.users.read().await.by_id.get(&id).cloned())
    }
}
