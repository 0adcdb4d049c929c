use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, instrument};

use crate::adapters::StockOracle;
use crate::domain::{Product, ProductId, Stock};
use crate::error::StockError;
use crate::messages::CatalogRequest;

/// Handle to the in-process catalog actor.
///
/// Doubles as a [`StockOracle`], so the cart can run against it without a
/// remote API.
#[derive(Clone)]
pub struct CatalogClient {
    sender: mpsc::Sender<CatalogRequest>,
}

impl CatalogClient {
    pub fn new(sender: mpsc::Sender<CatalogRequest>) -> Self {
        Self { sender }
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), StockError> {
        debug!("Sending shutdown");
        self.sender
            .send(CatalogRequest::Shutdown)
            .await
            .map_err(|_| StockError::ActorCommunicationError("Actor closed".to_string()))
    }
}

client_method!(CatalogClient => fn get_stock(id: ProductId) -> Stock as CatalogRequest::GetStock, Error = StockError);
client_method!(CatalogClient => fn get_product(id: ProductId) -> Product as CatalogRequest::GetProduct, Error = StockError);
client_method!(CatalogClient => fn put_product(product: Product, stock: u32) -> () as CatalogRequest::PutProduct, Error = StockError);
client_method!(CatalogClient => fn set_stock(id: ProductId, amount: u32) -> () as CatalogRequest::SetStock, Error = StockError);

#[async_trait]
impl StockOracle for CatalogClient {
    async fn stock(&self, id: ProductId) -> Result<Stock, StockError> {
        self.get_stock(id).await
    }

    async fn product(&self, id: ProductId) -> Result<Product, StockError> {
        self.get_product(id).await
    }
}
