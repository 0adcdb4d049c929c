use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, instrument};

use crate::domain::{Cart, ProductId};
use crate::error::CartError;
use crate::messages::{CartRequest, UpdateProductAmount};

/// Handle to the cart actor.
///
/// Mutations resolve once the actor has finished with the request. Whether
/// it succeeded is visible only through the cart contents and the
/// notifications it raised.
#[derive(Clone)]
pub struct CartClient {
    sender: mpsc::Sender<CartRequest>,
}

impl CartClient {
    pub fn new(sender: mpsc::Sender<CartRequest>) -> Self {
        Self { sender }
    }

    /// Current cart contents.
    #[instrument(skip(self))]
    pub async fn cart(&self) -> Result<Cart, CartError> {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(CartRequest::GetCart { respond_to })
            .await
            .map_err(|_| CartError::ActorCommunicationError("Actor closed".to_string()))?;
        response
            .await
            .map_err(|_| CartError::ActorCommunicationError("Actor dropped".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn add_product(&self, product_id: ProductId) {
        self.dispatch(|respond_to| CartRequest::AddProduct { product_id, respond_to })
            .await;
    }

    #[instrument(skip(self))]
    pub async fn remove_product(&self, product_id: ProductId) {
        self.dispatch(|respond_to| CartRequest::RemoveProduct { product_id, respond_to })
            .await;
    }

    #[instrument(skip(self, update), fields(product_id = update.product_id, amount = update.amount))]
    pub async fn update_product_amount(&self, update: UpdateProductAmount) {
        self.dispatch(|respond_to| CartRequest::UpdateProductAmount { update, respond_to })
            .await;
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), CartError> {
        debug!("Sending shutdown");
        self.sender
            .send(CartRequest::Shutdown)
            .await
            .map_err(|_| CartError::ActorCommunicationError("Actor closed".to_string()))
    }

    async fn dispatch(&self, request: impl FnOnce(oneshot::Sender<()>) -> CartRequest) {
        debug!("Sending request");
        let (respond_to, response) = oneshot::channel();
        if self.sender.send(request(respond_to)).await.is_err() {
            error!("Cart actor closed, request dropped");
            return;
        }
        if response.await.is_err() {
            error!("Cart actor dropped request without replying");
        }
    }
}
