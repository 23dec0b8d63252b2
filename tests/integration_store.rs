//! Integration tests for the PostgreSQL store
//!
//! These need a live database: `DATABASE_URL=... cargo test -- --ignored`

use std::sync::Arc;

use banka::domain::{
    generate_account_number, AccountStatus, AccountType, Amount, AmountError, Balance,
    DomainError, NewAccount, NewUser, Role, TransactionType,
};
use banka::store::{AccountStore, PgStore, StoreError, TransactionLog, UserStore};
use uuid::Uuid;

mod common;

async fn store() -> PgStore {
    PgStore::new(common::setup_test_db().await)
}

fn amount(value: i64) -> Amount {
    Amount::new(value).unwrap()
}

async fn open_account(store: &PgStore, balance: i64) -> i64 {
    let account = store
        .create_account(NewAccount {
            account_number: generate_account_number(),
            owner_id: 90,
            account_type: AccountType::Savings,
            opening_balance: Balance::new(balance).unwrap(),
        })
        .await
        .unwrap();
    account.account_number
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_schema_is_complete() {
    let pool = common::setup_test_db().await;
    assert!(banka::db::check_schema(&pool).await.unwrap());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_apply_and_record_and_history() {
    let store = store().await;
    let account_number = open_account(&store, 1000).await;

    let receipt = store
        .apply_and_record(account_number, amount(500), TransactionType::Credit, 90)
        .await
        .unwrap();
    assert_eq!(receipt.old_balance.value(), 1000);
    assert_eq!(receipt.account_balance.value(), 1500);
    assert_eq!(receipt.cashier, 90);

    let account = store.get_account(account_number).await.unwrap();
    assert_eq!(account.balance.value(), 1500);
    assert_eq!(account.version, 1);

    let history = store.transactions_for(account_number).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].transaction_id, receipt.transaction_id);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_overdraft_rejected() {
    let store = store().await;
    let account_number = open_account(&store, 100).await;

    let err = store
        .apply_and_record(account_number, amount(101), TransactionType::Debit, 90)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Domain(DomainError::InsufficientFunds { required: 101, available: 100 })
    ));

    let account = store.get_account(account_number).await.unwrap();
    assert_eq!(account.balance.value(), 100);
    assert_eq!(account.version, 0);
    assert!(store.transactions_for(account_number).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_failed_receipt_rolls_back_balance() {
    let pool = common::setup_test_db().await;
    let store = PgStore::new(pool.clone());
    let account_number = open_account(&store, 1000).await;

    // Occupy the receipt slot the next update would produce
    sqlx::query(
        "INSERT INTO transactions \
         (account_number, amount, cashier, transaction_type, old_balance, account_balance, version) \
         VALUES ($1, 1, 1, 'credit', 0, 1, 1)",
    )
    .bind(account_number)
    .execute(&pool)
    .await
    .unwrap();

    let result = store
        .apply_and_record(account_number, amount(400), TransactionType::Debit, 90)
        .await;
    assert!(result.is_err());

    let account = store.get_account(account_number).await.unwrap();
    assert_eq!(account.balance.value(), 1000);
    assert_eq!(account.version, 0);
    assert_eq!(store.transactions_for(account_number).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_dormant_account_rejected() {
    let store = store().await;
    let account_number = open_account(&store, 100).await;
    store
        .set_status(account_number, AccountStatus::Dormant)
        .await
        .unwrap();

    let err = store
        .apply_and_record(account_number, amount(10), TransactionType::Credit, 90)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Domain(DomainError::AccountNotActive(_))));

    let account = store.get_account(account_number).await.unwrap();
    assert_eq!(account.balance.value(), 100);
    assert_eq!(account.version, 0);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_credit_overflow_is_invalid_amount() {
    let store = store().await;
    let account_number = open_account(&store, i64::MAX - 5).await;

    let err = store
        .apply_and_record(account_number, amount(10), TransactionType::Credit, 90)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Domain(DomainError::InvalidAmount(AmountError::Overflow))
    ));

    let account = store.get_account(account_number).await.unwrap();
    assert_eq!(account.balance.value(), i64::MAX - 5);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_debits_never_overdraw() {
    let store = Arc::new(store().await);
    let account_number = open_account(&store, 1000).await;

    let mut handles = Vec::new();
    for _ in 0..50 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .apply_and_record(account_number, amount(30), TransactionType::Debit, 90)
                .await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            succeeded += 1;
        }
    }

    assert_eq!(succeeded, 33);
    let account = store.get_account(account_number).await.unwrap();
    assert_eq!(account.balance.value(), 10);
    assert_eq!(account.version, 33);
    assert_eq!(store.transactions_for(account_number).await.unwrap().len(), 33);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_status_and_soft_delete() {
    let store = store().await;
    let account_number = open_account(&store, 0).await;

    let account = store
        .set_status(account_number, AccountStatus::Dormant)
        .await
        .unwrap();
    assert_eq!(account.status, AccountStatus::Dormant);

    store.mark_deleted(account_number).await.unwrap();
    assert!(matches!(
        store.get_account(account_number).await,
        Err(StoreError::NotFound { .. })
    ));
    assert!(matches!(
        store
            .apply_and_record(account_number, amount(10), TransactionType::Credit, 90)
            .await,
        Err(StoreError::NotFound { .. })
    ));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_user_email_is_unique_case_insensitive() {
    let store = store().await;
    let email = format!("{}@banka.com", Uuid::new_v4());

    let new_user = |email: String| NewUser {
        first_name: "steve".to_string(),
        last_name: "cannon".to_string(),
        email,
        password_hash: "x$y".to_string(),
        role: Role::Client,
        is_admin: false,
    };

    let user = store.insert_user(new_user(email.clone())).await.unwrap();
    let err = store
        .insert_user(new_user(email.to_uppercase()))
        .await
        .unwrap_err();
    assert!(err.is_duplicate());

    let found = store
        .find_user_by_email(&email.to_uppercase())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, user.id);
    assert_eq!(store.find_user(user.id).await.unwrap().unwrap().email, email);
}
