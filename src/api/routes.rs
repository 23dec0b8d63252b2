//! API Routes
//!
//! HTTP endpoint definitions. Bodies are taken as raw bytes and decoded after
//! the token check, so a bad token always wins over a bad body.

use axum::{
    body::Bytes,
    extract::{Extension, Path, State},
    http::{header::AUTHORIZATION, HeaderMap},
    routing::{delete, get, patch, post},
    Router,
};

use crate::domain::{Account, Identity, OperationContext, Transaction};
use crate::error::AppError;
use crate::handlers::validator::parse_body;
use crate::handlers::{
    AccountHandler, AuthResult, ChangeStatusCommand, ChangeStatusResult, CreateAccountCommand,
    CreateAccountResult, DeleteAccountResult, SigninCommand, SignupCommand, TransactionCommand,
    TransactionHandler, UserHandler,
};

use super::response::ApiResponse;
use super::AppState;

/// Raw `Authorization` header value, if readable
pub fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}

fn caller(state: &AppState, headers: &HeaderMap) -> Result<Identity, AppError> {
    Ok(state.tokens.verify(authorization(headers))?)
}

/// Create API router with all routes
pub fn create_router() -> Router<AppState> {
    Router::new()
        // Users
        .route("/auth/signup", post(signup))
        .route("/auth/signin", post(signin))
        // Accounts
        .route("/accounts", post(create_account))
        .route("/accounts/:account_number", get(get_account))
        .route("/accounts/:account_number", patch(change_account_status))
        .route("/accounts/:account_number", delete(delete_account))
        .route("/accounts/:account_number/transactions", get(get_account_transactions))
        // Transactions
        .route("/transactions/:account_number/credit", post(credit))
        .route("/transactions/:account_number/debit", post(debit))
}

// =========================================================================
// POST /auth/signup, POST /auth/signin
// =========================================================================

async fn signup(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<ApiResponse<AuthResult>, AppError> {
    let command: SignupCommand = parse_body(&body)?;
    let handler = UserHandler::new(state.store, state.tokens);

    Ok(ApiResponse::created(handler.signup(command).await?))
}

async fn signin(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<ApiResponse<AuthResult>, AppError> {
    let command: SigninCommand = parse_body(&body)?;
    let handler = UserHandler::new(state.store, state.tokens);

    Ok(ApiResponse::ok(handler.signin(command).await?))
}

// =========================================================================
// /accounts
// =========================================================================

async fn create_account(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ApiResponse<CreateAccountResult>, AppError> {
    let caller = caller(&state, &headers)?;
    let command: CreateAccountCommand = parse_body(&body)?;

    let result = AccountHandler::new(state.store).create(&caller, command).await?;
    Ok(ApiResponse::created(result))
}

async fn get_account(
    State(state): State<AppState>,
    Path(account_number): Path<String>,
    headers: HeaderMap,
) -> Result<ApiResponse<Account>, AppError> {
    let caller = caller(&state, &headers)?;

    let account = AccountHandler::new(state.store)
        .details(&caller, &account_number)
        .await?;
    Ok(ApiResponse::ok(account))
}

async fn get_account_transactions(
    State(state): State<AppState>,
    Path(account_number): Path<String>,
    headers: HeaderMap,
) -> Result<ApiResponse<Vec<Transaction>>, AppError> {
    let caller = caller(&state, &headers)?;

    let history = AccountHandler::new(state.store)
        .history(&caller, &account_number)
        .await?;
    Ok(ApiResponse::ok(history))
}

async fn change_account_status(
    State(state): State<AppState>,
    Path(account_number): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ApiResponse<ChangeStatusResult>, AppError> {
    let caller = caller(&state, &headers)?;
    let command: ChangeStatusCommand = parse_body(&body)?;

    let result = AccountHandler::new(state.store)
        .change_status(&caller, &account_number, command)
        .await?;
    Ok(ApiResponse::ok(result))
}

async fn delete_account(
    State(state): State<AppState>,
    Path(account_number): Path<String>,
    headers: HeaderMap,
) -> Result<ApiResponse<DeleteAccountResult>, AppError> {
    let caller = caller(&state, &headers)?;

    let result = AccountHandler::new(state.store)
        .delete(&caller, &account_number)
        .await?;
    Ok(ApiResponse::ok(result))
}

// =========================================================================
// POST /transactions/:account_number/{credit,debit}
// =========================================================================

async fn credit(
    State(state): State<AppState>,
    Path(account_number): Path<String>,
    Extension(context): Extension<OperationContext>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ApiResponse<Vec<Transaction>>, AppError> {
    let command = TransactionCommand::credit(account_number, body);
    execute_transaction(state, &headers, command, &context).await
}

async fn debit(
    State(state): State<AppState>,
    Path(account_number): Path<String>,
    Extension(context): Extension<OperationContext>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ApiResponse<Vec<Transaction>>, AppError> {
    let command = TransactionCommand::debit(account_number, body);
    execute_transaction(state, &headers, command, &context).await
}

async fn execute_transaction(
    state: AppState,
    headers: &HeaderMap,
    command: TransactionCommand,
    context: &OperationContext,
) -> Result<ApiResponse<Vec<Transaction>>, AppError> {
    let handler = TransactionHandler::new(state.store, state.tokens);
    let receipt = handler
        .execute(authorization(headers), command, context)
        .await?;
    Ok(ApiResponse::ok(receipt))
}
