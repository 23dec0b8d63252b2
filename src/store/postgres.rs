//! PostgreSQL store
//!
//! Balance mutation is a single conditional `UPDATE`, so the row lock taken by
//! PostgreSQL serializes concurrent deltas on one account and the
//! non-negative check happens inside the same statement. The receipt insert
//! shares that database transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{
    Account, AccountNumber, AccountStatus, Amount, AmountError, AppliedDelta, Balance,
    DomainError, NewAccount, NewTransaction, NewUser, Transaction, TransactionType, User,
};

use super::{AccountStore, StoreError, StoreResult, TransactionLog, UserStore};

const ACCOUNT_COLUMNS: &str =
    "account_number, owner_id, account_type, balance, status, version, created_on, deleted_on";

const TRANSACTION_COLUMNS: &str = "transaction_id, account_number, amount, cashier, \
     transaction_type, old_balance, account_balance, version, created_on";

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, password_hash, user_type, is_admin, created_on";

#[derive(sqlx::FromRow)]
struct AccountRow {
    account_number: i64,
    owner_id: i64,
    account_type: String,
    balance: i64,
    status: String,
    version: i64,
    created_on: DateTime<Utc>,
    deleted_on: Option<DateTime<Utc>>,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            account_number: row.account_number,
            owner_id: row.owner_id,
            account_type: row.account_type.parse().map_err(StoreError::Corrupt)?,
            balance: Balance::new(row.balance).map_err(|e| StoreError::Corrupt(e.to_string()))?,
            status: row.status.parse().map_err(StoreError::Corrupt)?,
            version: row.version,
            created_on: row.created_on,
            deleted_on: row.deleted_on,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TransactionRow {
    transaction_id: i64,
    account_number: i64,
    amount: i64,
    cashier: i64,
    transaction_type: String,
    old_balance: i64,
    account_balance: i64,
    version: i64,
    created_on: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = StoreError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let corrupt = |e: crate::domain::AmountError| StoreError::Corrupt(e.to_string());
        Ok(Transaction {
            transaction_id: row.transaction_id,
            account_number: row.account_number,
            amount: row.amount.try_into().map_err(corrupt)?,
            cashier: row.cashier,
            transaction_type: row.transaction_type.parse().map_err(StoreError::Corrupt)?,
            old_balance: row.old_balance.try_into().map_err(corrupt)?,
            account_balance: row.account_balance.try_into().map_err(corrupt)?,
            version: row.version,
            created_on: row.created_on,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    user_type: String,
    is_admin: bool,
    created_on: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password_hash: row.password_hash,
            role: row.user_type.parse().map_err(StoreError::Corrupt)?,
            is_admin: row.is_admin,
            created_on: row.created_on,
        })
    }
}

/// Map a unique violation to `Duplicate`
fn duplicate_or(e: sqlx::Error, entity: &'static str, key: String) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Duplicate { entity, key }
        }
        _ => StoreError::Database(e),
    }
}

/// SQLSTATE 22003: `balance + delta` left the BIGINT range
fn out_of_range_or(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("22003") => {
            DomainError::from(AmountError::Overflow).into()
        }
        _ => StoreError::Database(e),
    }
}

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Update a live account, returning it or `NotFound`
    async fn update_live(
        &self,
        account_number: AccountNumber,
        set_clause: &str,
        status: Option<AccountStatus>,
    ) -> StoreResult<Account> {
        let sql = format!(
            "UPDATE accounts SET {set_clause} \
             WHERE account_number = $1 AND deleted_on IS NULL \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let mut query = sqlx::query_as::<_, AccountRow>(&sql).bind(account_number);
        if let Some(status) = status {
            query = query.bind(status.as_str());
        }

        query
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::account_not_found(account_number))?
            .try_into()
    }

    /// Why a conditional balance update matched no row
    async fn rejection(&self, account_number: AccountNumber, delta: i64) -> StoreError {
        let current: Result<Option<(i64, String)>, sqlx::Error> = sqlx::query_as(
            "SELECT balance, status FROM accounts WHERE account_number = $1 AND deleted_on IS NULL",
        )
        .bind(account_number)
        .fetch_optional(&self.pool)
        .await;

        match current {
            Ok(Some((_, status))) if status != AccountStatus::Active.as_str() => {
                DomainError::AccountNotActive(account_number).into()
            }
            Ok(Some((available, _))) => DomainError::insufficient_funds(-delta, available).into(),
            Ok(None) => StoreError::account_not_found(account_number),
            Err(e) => e.into(),
        }
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn create_account(&self, new: NewAccount) -> StoreResult<Account> {
        let query = format!(
            "INSERT INTO accounts (account_number, owner_id, account_type, balance) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row: AccountRow = sqlx::query_as(&query)
            .bind(new.account_number)
            .bind(new.owner_id)
            .bind(new.account_type.as_str())
            .bind(new.opening_balance.value())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| duplicate_or(e, "Account", new.account_number.to_string()))?;

        row.try_into()
    }

    async fn get_account(&self, account_number: AccountNumber) -> StoreResult<Account> {
        let query = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts \
             WHERE account_number = $1 AND deleted_on IS NULL"
        );
        sqlx::query_as::<_, AccountRow>(&query)
            .bind(account_number)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::account_not_found(account_number))?
            .try_into()
    }

    async fn apply_and_record(
        &self,
        account_number: AccountNumber,
        amount: Amount,
        transaction_type: TransactionType,
        cashier: i64,
    ) -> StoreResult<Transaction> {
        let delta = transaction_type.delta(&amount);

        let mut tx = self.pool.begin().await?;

        let applied: Option<(i64, i64, i64)> = sqlx::query_as(
            r#"
            UPDATE accounts
            SET balance = balance + $2, version = version + 1
            WHERE account_number = $1
              AND deleted_on IS NULL
              AND status = 'active'
              AND balance + $2 >= 0
            RETURNING balance - $2, balance, version
            "#,
        )
        .bind(account_number)
        .bind(delta)
        .fetch_optional(&mut *tx)
        .await
        .map_err(out_of_range_or)?;

        let Some((old_balance, new_balance, version)) = applied else {
            tx.rollback().await?;
            return Err(self.rejection(account_number, delta).await);
        };

        let corrupt = |e: AmountError| StoreError::Corrupt(e.to_string());
        let applied = AppliedDelta {
            account_number,
            old_balance: Balance::new(old_balance).map_err(corrupt)?,
            new_balance: Balance::new(new_balance).map_err(corrupt)?,
            version,
        };
        let new = NewTransaction::from_applied(&applied, amount, cashier, transaction_type);

        let query = format!(
            "INSERT INTO transactions \
             (account_number, amount, cashier, transaction_type, old_balance, account_balance, version) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {TRANSACTION_COLUMNS}"
        );
        let row: TransactionRow = sqlx::query_as(&query)
            .bind(new.account_number)
            .bind(new.amount.value())
            .bind(new.cashier)
            .bind(new.transaction_type.as_str())
            .bind(new.old_balance.value())
            .bind(new.account_balance.value())
            .bind(new.version)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        row.try_into()
    }

    async fn set_status(
        &self,
        account_number: AccountNumber,
        status: AccountStatus,
    ) -> StoreResult<Account> {
        self.update_live(account_number, "status = $2", Some(status))
            .await
    }

    async fn mark_deleted(&self, account_number: AccountNumber) -> StoreResult<Account> {
        self.update_live(account_number, "deleted_on = NOW()", None)
            .await
    }
}

#[async_trait]
impl TransactionLog for PgStore {
    async fn transactions_for(&self, account_number: AccountNumber) -> StoreResult<Vec<Transaction>> {
        let query = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions \
             WHERE account_number = $1 ORDER BY version"
        );
        sqlx::query_as::<_, TransactionRow>(&query)
            .bind(account_number)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, new: NewUser) -> StoreResult<User> {
        let query = format!(
            "INSERT INTO users (first_name, last_name, email, password_hash, user_type, is_admin) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {USER_COLUMNS}"
        );
        let row: UserRow = sqlx::query_as(&query)
            .bind(&new.first_name)
            .bind(&new.last_name)
            .bind(&new.email)
            .bind(&new.password_hash)
            .bind(new.role.as_str())
            .bind(new.is_admin)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| duplicate_or(e, "User", new.email.clone()))?;

        row.try_into()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }
}
