//! Account Handler
//!
//! Account lifecycle: open, change status, soft delete, and reads.
//! Callers are already authenticated; the identity is passed in explicitly.

use std::sync::Arc;

use crate::domain::{
    generate_account_number, Account, AccountStatus, AccountType, Balance, Identity, NewAccount,
    Transaction,
};
use crate::error::{AppError, AppResult};
use crate::store::{AccountStore, Store, TransactionLog, UserStore};

use super::validator::parse_account_number;
use super::{
    ChangeStatusCommand, ChangeStatusResult, CreateAccountCommand, CreateAccountResult,
    DeleteAccountResult,
};

/// Attempts at finding an unused random account number
const ACCOUNT_NUMBER_ATTEMPTS: usize = 5;

pub const INVALID_ACCOUNT_TYPE: &str = "Account type must be savings or current";
pub const INVALID_OPENING_BALANCE: &str = "Opening balance cannot be negative";
pub const INVALID_STATUS: &str = "Status must be active or dormant";
pub const ADMIN_ONLY: &str = "Only an admin can change account status";
pub const CANNOT_DELETE: &str = "You cannot delete this account";
pub const CANNOT_VIEW: &str = "You cannot view this account";

/// Handler for account lifecycle operations
pub struct AccountHandler {
    store: Arc<dyn Store>,
}

impl AccountHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Open an account owned by the caller
    pub async fn create(
        &self,
        caller: &Identity,
        command: CreateAccountCommand,
    ) -> AppResult<CreateAccountResult> {
        let account_type: AccountType = command
            .account_type
            .as_deref()
            .ok_or_else(|| AppError::bad_request(INVALID_ACCOUNT_TYPE))?
            .parse()
            .map_err(|_| AppError::bad_request(INVALID_ACCOUNT_TYPE))?;

        let opening_balance = Balance::new(command.opening_balance.unwrap_or(0))
            .map_err(|_| AppError::bad_request(INVALID_OPENING_BALANCE))?;

        let account = self.insert_with_fresh_number(caller.id, account_type, opening_balance).await?;

        // Tokens can outlive or predate the user record
        let owner = self.store.find_user(caller.id).await?;

        tracing::info!(
            account_number = account.account_number,
            owner_id = account.owner_id,
            account_type = %account.account_type,
            "Account created"
        );

        Ok(CreateAccountResult {
            account_number: account.account_number,
            first_name: owner.as_ref().map(|u| u.first_name.clone()),
            last_name: owner.as_ref().map(|u| u.last_name.clone()),
            email: owner.map(|u| u.email).unwrap_or_else(|| caller.email.clone()),
            account_type: account.account_type,
            opening_balance: account.balance.value(),
            status: account.status,
        })
    }

    async fn insert_with_fresh_number(
        &self,
        owner_id: i64,
        account_type: AccountType,
        opening_balance: Balance,
    ) -> AppResult<Account> {
        for _ in 0..ACCOUNT_NUMBER_ATTEMPTS {
            let new = NewAccount {
                account_number: generate_account_number(),
                owner_id,
                account_type,
                opening_balance,
            };
            match self.store.create_account(new).await {
                Ok(account) => return Ok(account),
                Err(e) if e.is_duplicate() => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::Internal(
            "Could not allocate an unused account number".to_string(),
        ))
    }

    /// Activate or deactivate an account (admin only)
    pub async fn change_status(
        &self,
        caller: &Identity,
        raw_account_number: &str,
        command: ChangeStatusCommand,
    ) -> AppResult<ChangeStatusResult> {
        let account_number = parse_account_number(raw_account_number)?;

        if !caller.is_admin {
            return Err(AppError::unauthorized(ADMIN_ONLY));
        }

        let status: AccountStatus = command
            .status
            .as_deref()
            .ok_or_else(|| AppError::bad_request(INVALID_STATUS))?
            .parse()
            .map_err(|_| AppError::bad_request(INVALID_STATUS))?;

        let account = self.store.set_status(account_number, status).await?;

        tracing::info!(
            account_number = account.account_number,
            status = %account.status,
            admin_id = caller.id,
            "Account status changed"
        );

        Ok(ChangeStatusResult {
            account_number: account.account_number,
            status: account.status,
        })
    }

    /// Soft-delete an account (owner or staff)
    pub async fn delete(
        &self,
        caller: &Identity,
        raw_account_number: &str,
    ) -> AppResult<DeleteAccountResult> {
        let account_number = parse_account_number(raw_account_number)?;
        let account = self.store.get_account(account_number).await?;

        if !caller.can_access(account.owner_id) {
            return Err(AppError::unauthorized(CANNOT_DELETE));
        }

        self.store.mark_deleted(account_number).await?;

        tracing::info!(account_number, deleted_by = caller.id, "Account deleted");

        Ok(DeleteAccountResult {
            message: "Account successfully deleted".to_string(),
        })
    }

    /// Account details (owner or staff)
    pub async fn details(&self, caller: &Identity, raw_account_number: &str) -> AppResult<Account> {
        let account_number = parse_account_number(raw_account_number)?;
        self.visible_account(caller, account_number).await
    }

    /// Transaction history in application order (owner or staff)
    pub async fn history(
        &self,
        caller: &Identity,
        raw_account_number: &str,
    ) -> AppResult<Vec<Transaction>> {
        let account_number = parse_account_number(raw_account_number)?;
        self.visible_account(caller, account_number).await?;
        Ok(self.store.transactions_for(account_number).await?)
    }

    async fn visible_account(&self, caller: &Identity, account_number: i64) -> AppResult<Account> {
        let account = self.store.get_account(account_number).await?;

        if !caller.can_access(account.owner_id) {
            return Err(AppError::unauthorized(CANNOT_VIEW));
        }
        Ok(account)
    }
}
