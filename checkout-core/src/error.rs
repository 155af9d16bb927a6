//! Error types for the checkout core

use crate::store::StoreError;
use thiserror::Error;

/// Command-level error
///
/// `Validation` carries a user-facing business-rule message (inactive
/// payment method, failed capability check, precondition violation).
/// Gateway failures are *not* represented here: they are folded into
/// accumulated error-string results so the caller can display every
/// sub-error together.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Payment transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Order item not found: {0}")]
    ItemNotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl OrderError {
    pub fn validation(message: impl Into<String>) -> Self {
        OrderError::Validation(message.into())
    }
}
