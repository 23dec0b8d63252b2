//! Store Errors

use crate::domain::DomainError;

/// Errors that can occur in a store backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Record does not exist
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Unique key already taken
    #[error("{entity} already exists: {key}")]
    Duplicate { entity: &'static str, key: String },

    /// Business rule rejected the mutation
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Stored value could not be mapped back to a domain type
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn account_not_found(account_number: i64) -> Self {
        Self::NotFound {
            entity: "Account",
            key: account_number.to_string(),
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
