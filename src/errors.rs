use std::result::Result as StdResult;

use thiserror::Error;

use crate::core::budget_manager::RequestKind;

/// Unified error type for the core, storage, and configuration layers.
#[derive(Error, Debug)]
pub enum BudgetError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("A {0} request is already in progress")]
    RequestPending(RequestKind),
    #[error("Request ticket does not match an in-flight {0} request")]
    UnknownRequest(RequestKind),
}

pub type Result<T> = StdResult<T, BudgetError>;

impl From<std::io::Error> for BudgetError {
    fn from(err: std::io::Error) -> Self {
        BudgetError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for BudgetError {
    fn from(err: serde_json::Error) -> Self {
        BudgetError::StorageError(err.to_string())
    }
}
