//! Cross-handler flow tests
//!
//! Exercise users, accounts and transactions together over one in-memory
//! store, the way the API wires them.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use crate::auth::TokenService;
    use crate::domain::{AccountStatus, AccountType, OperationContext, TransactionType};
    use crate::handlers::{
        AccountHandler, ChangeStatusCommand, CreateAccountCommand, SigninCommand, SignupCommand,
        TransactionCommand, TransactionHandler, UserHandler,
    };
    use crate::store::{MemoryStore, Store};

    struct Handlers {
        users: UserHandler,
        accounts: AccountHandler,
        transactions: TransactionHandler,
        tokens: TokenService,
    }

    fn handlers() -> Handlers {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let tokens = TokenService::new("flow-secret", Duration::hours(24));
        Handlers {
            users: UserHandler::new(store.clone(), tokens.clone()),
            accounts: AccountHandler::new(store.clone()),
            transactions: TransactionHandler::new(store, tokens.clone()),
            tokens,
        }
    }

    // =========================================================================
    // Signup -> open account -> transact -> history
    // =========================================================================

    #[tokio::test]
    async fn test_client_banking_flow() {
        let h = handlers();
        let context = OperationContext::new().with_correlation_id(uuid::Uuid::new_v4());

        let auth = h
            .users
            .signup(SignupCommand::new("steve", "cannon", "steve@banka.com", "delapassword"))
            .await
            .unwrap();
        let caller = h.tokens.verify(Some(&auth.token)).unwrap();

        let account = h
            .accounts
            .create(
                &caller,
                CreateAccountCommand::new(AccountType::Current).with_opening_balance(1000),
            )
            .await
            .unwrap();
        assert_eq!(account.first_name.as_deref(), Some("steve"));
        let number = account.account_number.to_string();

        let credit = h
            .transactions
            .execute(
                Some(&auth.token),
                TransactionCommand::credit(number.clone(), r#"{"amount": 400}"#),
                &context,
            )
            .await
            .unwrap();
        assert_eq!(credit[0].account_balance.value(), 1400);

        let debit = h
            .transactions
            .execute(
                Some(&auth.token),
                TransactionCommand::debit(number.clone(), r#"{"amount": 1400}"#),
                &context,
            )
            .await
            .unwrap();
        assert_eq!(debit[0].account_balance.value(), 0);

        let history = h.accounts.history(&caller, &number).await.unwrap();
        let types: Vec<TransactionType> = history.iter().map(|t| t.transaction_type).collect();
        assert_eq!(types, vec![TransactionType::Credit, TransactionType::Debit]);
        assert!(history[0].transaction_id < history[1].transaction_id);

        let details = h.accounts.details(&caller, &number).await.unwrap();
        assert_eq!(details.balance.value(), 0);
        assert_eq!(details.version, 2);
    }

    // =========================================================================
    // Admin deactivation blocks transactions
    // =========================================================================

    #[tokio::test]
    async fn test_admin_deactivation_flow() {
        let h = handlers();
        let context = OperationContext::new();

        h.users.ensure_admin("admin@banka.com", "adminpass").await.unwrap();
        let admin = h
            .users
            .signin(SigninCommand::new("admin@banka.com", "adminpass"))
            .await
            .unwrap();
        let admin = h.tokens.verify(Some(&admin.token)).unwrap();

        let client = h
            .users
            .signup(SignupCommand::new("ada", "obi", "ada@banka.com", "delapassword"))
            .await
            .unwrap();
        let client_identity = h.tokens.verify(Some(&client.token)).unwrap();

        let account = h
            .accounts
            .create(
                &client_identity,
                CreateAccountCommand::new(AccountType::Savings).with_opening_balance(50),
            )
            .await
            .unwrap();
        let number = account.account_number.to_string();

        let result = h
            .accounts
            .change_status(&admin, &number, ChangeStatusCommand::new(AccountStatus::Dormant))
            .await
            .unwrap();
        assert_eq!(result.status, AccountStatus::Dormant);

        let err = h
            .transactions
            .execute(
                Some(&client.token),
                TransactionCommand::credit(number.clone(), r#"{"amount": 10}"#),
                &context,
            )
            .await
            .unwrap_err();
        assert_eq!(err.public_message(), "Account is not active");

        h.accounts
            .change_status(&admin, &number, ChangeStatusCommand::new(AccountStatus::Active))
            .await
            .unwrap();

        let receipt = h
            .transactions
            .execute(
                Some(&client.token),
                TransactionCommand::credit(number, r#"{"amount": 10}"#),
                &context,
            )
            .await
            .unwrap();
        assert_eq!(receipt[0].account_balance.value(), 60);
    }
}
