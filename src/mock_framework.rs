//! # Mock Framework
//!
//! Utilities for testing the cart against a scripted catalog.
//!
//! Use [`create_mock_catalog_client`] to get a client and a receiver, then
//! [`expect_get_stock`] / [`expect_get_product`] to assert each lookup and
//! answer it. [`RecordingNotifier`] captures what the user would have seen,
//! and [`FailingStorage`] rejects every write.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::adapters::{CartStorage, Notifier};
use crate::clients::CatalogClient;
use crate::domain::{Product, ProductId, Stock};
use crate::error::{StockError, StorageError};
use crate::messages::{CatalogRequest, ServiceResponse};

/// Creates a catalog client whose requests land on a receiver the test controls.
///
/// Answers can be delayed, reordered or turned into failures at will, which is
/// how the tests observe what the cart does while a lookup is in flight.
pub fn create_mock_catalog_client(buffer_size: usize) -> (CatalogClient, mpsc::Receiver<CatalogRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (CatalogClient::new(sender), receiver)
}

/// Helper to verify that the next message is a stock lookup
pub async fn expect_get_stock(
    receiver: &mut mpsc::Receiver<CatalogRequest>,
) -> Option<(ProductId, ServiceResponse<Stock, StockError>)> {
    match receiver.recv().await {
        Some(CatalogRequest::GetStock { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a product lookup
pub async fn expect_get_product(
    receiver: &mut mpsc::Receiver<CatalogRequest>,
) -> Option<(ProductId, ServiceResponse<Product, StockError>)> {
    match receiver.recv().await {
        Some(CatalogRequest::GetProduct { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Notifier that keeps every message for later assertions. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// Storage that reads as empty and fails every write.
#[derive(Debug, Clone, Default)]
pub struct FailingStorage;

impl CartStorage for FailingStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Io("disk full".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_catalog_client() {
        let (client, mut receiver) = create_mock_catalog_client(10);

        let lookup = tokio::spawn(async move { client.get_stock(7).await });

        let (id, responder) = expect_get_stock(&mut receiver).await.expect("Expected GetStock request");
        assert_eq!(id, 7);
        responder.send(Ok(Stock::new(7, 2))).unwrap();

        let result = lookup.await.unwrap();
        assert_eq!(result, Ok(Stock::new(7, 2)));
    }
}
