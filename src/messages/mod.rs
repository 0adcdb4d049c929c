use tokio::sync::oneshot;

use crate::domain::{Cart, Product, ProductId, Stock};
use crate::error::StockError;

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Requested quantity for a cart entry, usually coming from a UI stepper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: i64,
}

/// Messages handled by the cart actor.
///
/// Mutations reply with a bare `()` once they have been applied or reported;
/// failures never travel back to the caller.
#[derive(Debug)]
pub enum CartRequest {
    GetCart {
        respond_to: oneshot::Sender<Cart>,
    },
    AddProduct {
        product_id: ProductId,
        respond_to: oneshot::Sender<()>,
    },
    RemoveProduct {
        product_id: ProductId,
        respond_to: oneshot::Sender<()>,
    },
    UpdateProductAmount {
        update: UpdateProductAmount,
        respond_to: oneshot::Sender<()>,
    },
    Shutdown,
}

/// Messages handled by the in-process catalog actor.
#[derive(Debug)]
pub enum CatalogRequest {
    GetStock {
        id: ProductId,
        respond_to: ServiceResponse<Stock, StockError>,
    },
    GetProduct {
        id: ProductId,
        respond_to: ServiceResponse<Product, StockError>,
    },
    PutProduct {
        product: Product,
        stock: u32,
        respond_to: ServiceResponse<(), StockError>,
    },
    SetStock {
        id: ProductId,
        amount: u32,
        respond_to: ServiceResponse<(), StockError>,
    },
    Shutdown,
}
