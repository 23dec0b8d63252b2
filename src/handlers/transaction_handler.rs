//! Transaction Handler
//!
//! Credits and debits a single account. Each request moves through
//! `Received -> Authenticated -> Validated -> Applied -> Recorded`; any gate
//! may reject, and nothing is mutated before `Applied`.

use std::sync::Arc;

use crate::auth::TokenService;
use crate::domain::{Identity, OperationContext, Transaction};
use crate::error::AppResult;
use crate::store::{AccountStore, Store};

use super::validator::{self, ValidatedRequest};
use super::TransactionCommand;

/// Handler for credit/debit transactions
pub struct TransactionHandler {
    store: Arc<dyn Store>,
    tokens: TokenService,
}

impl TransactionHandler {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    /// Execute the transaction command.
    ///
    /// Returns the receipt as a one-element list.
    pub async fn execute(
        &self,
        authorization: Option<&str>,
        command: TransactionCommand,
        context: &OperationContext,
    ) -> AppResult<Vec<Transaction>> {
        let caller = self.tokens.verify(authorization)?;

        let request = validator::validate(
            &command.account_number,
            &command.body,
            command.transaction_type,
        )?;

        let transaction = self.apply(&caller, request, context).await?;
        Ok(vec![transaction])
    }

    async fn apply(
        &self,
        caller: &Identity,
        request: ValidatedRequest,
        context: &OperationContext,
    ) -> AppResult<Transaction> {
        let account = self.store.get_account(request.account_number).await?;
        validator::check_account(&account, &request)?;

        // The store re-checks status and funds under the account lock and
        // writes the receipt in the same step
        let transaction = self
            .store
            .apply_and_record(
                request.account_number,
                request.amount,
                request.transaction_type,
                caller.id,
            )
            .await
            .map_err(|e| {
                tracing::debug!(
                    account_number = request.account_number,
                    correlation_id = ?context.correlation_id,
                    error = %e,
                    "Transaction rejected by store"
                );
                e
            })?;

        tracing::info!(
            transaction_id = transaction.transaction_id,
            account_number = transaction.account_number,
            transaction_type = %transaction.transaction_type,
            amount = transaction.amount.value(),
            account_balance = transaction.account_balance.value(),
            cashier = caller.id,
            correlation_id = ?context.correlation_id,
            "Transaction recorded"
        );

        Ok(transaction)
    }
}
