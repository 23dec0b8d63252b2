//! Command Handlers module
//!
//! Handlers that orchestrate business operations against the injected store.

mod account_handler;
mod commands;
mod transaction_handler;
mod user_handler;
pub mod validator;

#[cfg(test)]
mod tests;

pub use account_handler::AccountHandler;
pub use commands::*;
pub use transaction_handler::TransactionHandler;
pub use user_handler::UserHandler;
