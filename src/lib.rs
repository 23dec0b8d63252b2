//! Banka Library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod store;

mod error;

pub use api::{build_router, AppState};
pub use config::Config;
pub use domain::{Amount, AmountError, Balance, DomainError, OperationContext};
pub use error::{AppError, AppResult, ErrorResponse, ACCOUNT_NOT_FOUND, INSUFFICIENT_FUNDS};
