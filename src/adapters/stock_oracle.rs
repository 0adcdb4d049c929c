use async_trait::async_trait;

use crate::domain::{Product, ProductId, Stock};
use crate::error::StockError;

/// Read-only source of stock levels and product metadata.
///
/// Implementations must report a missing product as [`StockError::NotFound`]
/// so callers can tell it apart from transport failures.
#[async_trait]
pub trait StockOracle: Send + Sync + 'static {
    async fn stock(&self, id: ProductId) -> Result<Stock, StockError>;
    async fn product(&self, id: ProductId) -> Result<Product, StockError>;
}
