//! Domain error types and their classification.

use common::{NotAdmin, ProductId};
use serde::{Deserialize, Serialize};
use store::StoreError;
use thiserror::Error;

use crate::order::OrderError;

/// Bad input that the caller can fix and resubmit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Quantity {quantity} is out of range (must be between 1 and 99)")]
    QuantityOutOfRange { quantity: i64 },

    #[error("Product {product_id} is not available")]
    ProductInactive { product_id: ProductId },

    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("Unknown order status: {value}")]
    UnknownStatus { value: String },

    #[error("Invalid product: {0}")]
    InvalidProduct(String),
}

/// Coarse error classes callers react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    EmptyCart,
    Unauthorized,
    /// Infrastructure failure; worth retrying later.
    Transient,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::EmptyCart => "empty_cart",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Transient => "transient",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Absent, or owned by someone other than the caller.
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] NotAdmin),

    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation(_) => ErrorKind::Validation,
            DomainError::NotFound { .. } => ErrorKind::NotFound,
            DomainError::EmptyCart => ErrorKind::EmptyCart,
            DomainError::Unauthorized(_) => ErrorKind::Unauthorized,
            DomainError::Order(err) => match err {
                OrderError::NotPlaced => ErrorKind::NotFound,
                OrderError::TerminalStatus { .. } => ErrorKind::Validation,
                OrderError::NoLines => ErrorKind::EmptyCart,
                OrderError::AlreadyPlaced => ErrorKind::Transient,
            },
            DomainError::Store(_) | DomainError::Serialization(_) => ErrorKind::Transient,
        }
    }
}
