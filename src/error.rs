use std::fmt;

use thiserror::Error;

use crate::domain::ProductId;

/// The cart operation an error came from. Drives the wording of notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Remove,
    UpdateAmount,
}

impl Operation {
    fn failure_message(self) -> &'static str {
        match self {
            Operation::Add => "Error adding product",
            Operation::Remove => "Error removing product",
            Operation::UpdateAmount => "Error changing product amount",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Add => write!(f, "add"),
            Operation::Remove => write!(f, "remove"),
            Operation::UpdateAmount => write!(f, "update amount"),
        }
    }
}

/// Errors raised by a Stock Oracle lookup.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StockError {
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unexpected HTTP status {status} for {resource}")]
    Status { status: u16, resource: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

/// Errors raised by a persistence adapter.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(String),
    #[error("Storage format error: {0}")]
    Format(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Format(e.to_string())
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e.to_string())
    }
}

/// Everything that can go wrong inside a cart operation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    #[error("Out of stock for product {product_id}: requested {requested}, available {available}")]
    OutOfStock { product_id: ProductId, requested: u64, available: u32 },
    #[error("Product {product_id} is not in the cart ({operation})")]
    NotFound { product_id: ProductId, operation: Operation },
    #[error("Product {product_id} not found remotely ({operation})")]
    RemoteNotFound { product_id: ProductId, operation: Operation },
    #[error("Stock lookup for product {product_id} failed ({operation}): {source}")]
    Remote { product_id: ProductId, operation: Operation, source: StockError },
    #[error("Invalid amount {amount} for product {product_id}")]
    InvalidAmount { product_id: ProductId, amount: i64 },
    #[error("Failed to persist cart: {0}")]
    Storage(#[from] StorageError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl CartError {
    /// Converts a Stock Oracle failure, keeping not-found distinguishable.
    pub fn from_stock(product_id: ProductId, operation: Operation, source: StockError) -> Self {
        match source {
            StockError::NotFound(_) => CartError::RemoteNotFound { product_id, operation },
            source => CartError::Remote { product_id, operation, source },
        }
    }

    /// Text shown to the user through the notification sink.
    pub fn user_message(&self) -> String {
        match self {
            CartError::OutOfStock { .. } => "Requested amount is out of stock".to_string(),
            CartError::NotFound { operation, .. } | CartError::RemoteNotFound { operation, .. } => {
                operation.failure_message().to_string()
            }
            CartError::Remote { operation, source, .. } => {
                format!("{}: {}", operation.failure_message(), source)
            }
            CartError::InvalidAmount { .. } => Operation::UpdateAmount.failure_message().to_string(),
            CartError::Storage(_) => "Could not save cart".to_string(),
            CartError::ActorCommunicationError(_) => "Cart is unavailable".to_string(),
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
