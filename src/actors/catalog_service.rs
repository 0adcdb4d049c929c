use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::clients::CatalogClient;
use crate::domain::{Product, ProductId, Stock};
use crate::error::StockError;
use crate::messages::{CatalogRequest, ServiceResponse};

/// In-process product and stock table answering the same questions as the
/// storefront API. Stock levels change only through explicit `SetStock` or
/// `PutProduct` requests, never through cart activity.
pub struct CatalogService {
    receiver: mpsc::Receiver<CatalogRequest>,
    products: HashMap<ProductId, Product>,
    stock: HashMap<ProductId, u32>,
}

impl CatalogService {
    pub fn new(buffer_size: usize) -> (Self, CatalogClient) {
        Self::seeded(buffer_size, Vec::new())
    }

    pub fn seeded(
        buffer_size: usize,
        entries: impl IntoIterator<Item = (Product, u32)>,
    ) -> (Self, CatalogClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let mut products = HashMap::new();
        let mut stock = HashMap::new();
        for (product, amount) in entries {
            stock.insert(product.id, amount);
            products.insert(product.id, product);
        }
        let service = Self {
            receiver,
            products,
            stock,
        };
        (service, CatalogClient::new(sender))
    }

    #[instrument(name = "catalog_service", skip(self))]
    pub async fn run(mut self) {
        info!(products = self.products.len(), "CatalogService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CatalogRequest::GetStock { id, respond_to } => self.handle_get_stock(id, respond_to),
                CatalogRequest::GetProduct { id, respond_to } => self.handle_get_product(id, respond_to),
                CatalogRequest::PutProduct { product, stock, respond_to } => {
                    self.handle_put_product(product, stock, respond_to)
                }
                CatalogRequest::SetStock { id, amount, respond_to } => {
                    self.handle_set_stock(id, amount, respond_to)
                }
                CatalogRequest::Shutdown => {
                    info!("CatalogService shutting down");
                    break;
                }
            }
        }

        info!("CatalogService stopped");
    }

    #[instrument(fields(product_id = id), skip(self, respond_to))]
    fn handle_get_stock(&self, id: ProductId, respond_to: ServiceResponse<Stock, StockError>) {
        debug!("Processing get_stock request");
        let result = match self.stock.get(&id) {
            Some(&amount) => Ok(Stock::new(id, amount)),
            None => {
                debug!("Stock not found");
                Err(StockError::NotFound(format!("stock/{id}")))
            }
        };
        let _ = respond_to.send(result);
    }

    #[instrument(fields(product_id = id), skip(self, respond_to))]
    fn handle_get_product(&self, id: ProductId, respond_to: ServiceResponse<Product, StockError>) {
        debug!("Processing get_product request");
        let result = self
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| StockError::NotFound(format!("products/{id}")));
        let _ = respond_to.send(result);
    }

    #[instrument(fields(product_id = product.id), skip(self, product, respond_to))]
    fn handle_put_product(
        &mut self,
        product: Product,
        stock: u32,
        respond_to: ServiceResponse<(), StockError>,
    ) {
        self.stock.insert(product.id, stock);
        self.products.insert(product.id, product);
        info!("Product stored");
        let _ = respond_to.send(Ok(()));
    }

    #[instrument(fields(product_id = id), skip(self, respond_to))]
    fn handle_set_stock(
        &mut self,
        id: ProductId,
        amount: u32,
        respond_to: ServiceResponse<(), StockError>,
    ) {
        let result = match self.stock.get_mut(&id) {
            Some(level) => {
                *level = amount;
                info!("Stock level updated");
                Ok(())
            }
            None => {
                warn!("Cannot set stock for unknown product");
                Err(StockError::NotFound(format!("stock/{id}")))
            }
        };
        let _ = respond_to.send(result);
    }
}
