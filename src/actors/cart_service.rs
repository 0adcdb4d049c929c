use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, instrument, warn};

use crate::adapters::{CartStorage, Notifier, StockOracle};
use crate::clients::CartClient;
use crate::domain::{Cart, ProductId};
use crate::error::{CartError, Operation, StockError, StorageError};
use crate::messages::{CartRequest, UpdateProductAmount};

/// Single owner of the cart.
///
/// Requests are handled strictly one after another, remote lookups included,
/// so two mutations of the same product can never interleave. Every failure
/// ends at [`CartService::report`] and is turned into a user notification.
pub struct CartService {
    receiver: mpsc::Receiver<CartRequest>,
    cart: Cart,
    storage_key: String,
    oracle: Arc<dyn StockOracle>,
    storage: Arc<dyn CartStorage>,
    notifier: Arc<dyn Notifier>,
}

impl CartService {
    /// Creates the actor with its cart restored from `storage`.
    pub fn new(
        buffer_size: usize,
        storage_key: impl Into<String>,
        oracle: Arc<dyn StockOracle>,
        storage: Arc<dyn CartStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> (Self, CartClient) {
        let storage_key = storage_key.into();
        let cart = restore_cart(storage.as_ref(), &storage_key);
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            cart,
            storage_key,
            oracle,
            storage,
            notifier,
        };
        (service, CartClient::new(sender))
    }

    #[instrument(name = "cart_service", skip(self))]
    pub async fn run(mut self) {
        info!(entries = self.cart.len(), "CartService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CartRequest::GetCart { respond_to } => {
                    let _ = respond_to.send(self.cart.clone());
                }
                CartRequest::AddProduct { product_id, respond_to } => {
                    self.handle_add_product(product_id, respond_to).await;
                }
                CartRequest::RemoveProduct { product_id, respond_to } => {
                    self.handle_remove_product(product_id, respond_to);
                }
                CartRequest::UpdateProductAmount { update, respond_to } => {
                    self.handle_update_product_amount(update, respond_to).await;
                }
                CartRequest::Shutdown => {
                    info!("CartService shutting down");
                    break;
                }
            }
        }

        info!("CartService stopped");
    }

    #[instrument(skip(self, respond_to))]
    async fn handle_add_product(&mut self, product_id: ProductId, respond_to: oneshot::Sender<()>) {
        debug!("Processing add_product request");
        if let Err(e) = self.add_product(product_id).await {
            self.report(&e);
        }
        let _ = respond_to.send(());
    }

    #[instrument(skip(self, respond_to))]
    fn handle_remove_product(&mut self, product_id: ProductId, respond_to: oneshot::Sender<()>) {
        debug!("Processing remove_product request");
        if let Err(e) = self.remove_product(product_id) {
            self.report(&e);
        }
        let _ = respond_to.send(());
    }

    #[instrument(
        fields(product_id = update.product_id, amount = update.amount),
        skip(self, update, respond_to)
    )]
    async fn handle_update_product_amount(
        &mut self,
        update: UpdateProductAmount,
        respond_to: oneshot::Sender<()>,
    ) {
        debug!("Processing update_product_amount request");
        if let Err(e) = self.update_product_amount(update).await {
            self.report(&e);
        }
        let _ = respond_to.send(());
    }

    async fn add_product(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let stock = self
            .oracle
            .stock(product_id)
            .await
            .map_err(|e| CartError::from_stock(product_id, Operation::Add, e))?;
        let product = self
            .oracle
            .product(product_id)
            .await
            .map_err(|e| CartError::from_stock(product_id, Operation::Add, e))?;
        if product.id != product_id {
            return Err(CartError::Remote {
                product_id,
                operation: Operation::Add,
                source: StockError::Decode(format!("products/{product_id} returned product {}", product.id)),
            });
        }

        let amount = self.cart.add(product, stock.amount)?;
        info!(amount, available = stock.amount, "Product added to cart");
        self.persist()
    }

    fn remove_product(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let removed = self.cart.remove(product_id)?;
        info!(amount = removed.amount, "Product removed from cart");
        self.persist()
    }

    async fn update_product_amount(&mut self, update: UpdateProductAmount) -> Result<(), CartError> {
        let UpdateProductAmount { product_id, amount } = update;
        if amount < 1 {
            debug!("Ignoring non-positive amount");
            return Ok(());
        }
        if !self.cart.contains(product_id) {
            return Err(CartError::NotFound { product_id, operation: Operation::UpdateAmount });
        }

        let stock = self
            .oracle
            .stock(product_id)
            .await
            .map_err(|e| CartError::from_stock(product_id, Operation::UpdateAmount, e))?;
        let amount = u32::try_from(amount).map_err(|_| CartError::OutOfStock {
            product_id,
            requested: amount.unsigned_abs(),
            available: stock.amount,
        })?;

        self.cart.set_amount(product_id, amount, stock.amount)?;
        info!(available = stock.amount, "Product amount updated");
        self.persist()
    }

    /// Writes the whole cart under the storage key.
    ///
    /// The in-memory cart is already updated when this runs; a failed write
    /// leaves memory and storage out of step until the next successful one.
    fn persist(&self) -> Result<(), CartError> {
        let raw = self.cart.to_json().map_err(StorageError::from)?;
        self.storage.set(&self.storage_key, &raw)?;
        debug!(entries = self.cart.len(), "Cart persisted");
        Ok(())
    }

    fn report(&self, err: &CartError) {
        match err {
            CartError::OutOfStock { .. } | CartError::NotFound { .. } => {
                warn!(error = %err, "Cart operation rejected")
            }
            _ => error!(error = %err, "Cart operation failed"),
        }
        self.notifier.error(&err.user_message());
    }
}

/// Loads the persisted cart. Missing, unreadable or malformed data all yield
/// an empty cart.
fn restore_cart(storage: &dyn CartStorage, key: &str) -> Cart {
    match storage.get(key) {
        Ok(Some(raw)) => match Cart::from_json(&raw) {
            Ok(cart) => {
                info!(entries = cart.len(), "Restored persisted cart");
                cart
            }
            Err(e) => {
                warn!(error = %e, "Persisted cart is malformed, starting empty");
                Cart::new()
            }
        },
        Ok(None) => Cart::new(),
        Err(e) => {
            warn!(error = %e, "Persisted cart is unreadable, starting empty");
            Cart::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::CatalogService;
    use crate::adapters::MemoryStorage;
    use crate::domain::{CartItem, Product};
    use crate::mock_framework::{FailingStorage, RecordingNotifier};

    const KEY: &str = "@RocketShoes:cart";

    fn shoe(id: ProductId) -> Product {
        Product::new(id, format!("Shoe {id}"), 139.9, format!("shoe-{id}.jpg"))
    }

    struct Harness {
        client: CartClient,
        storage: MemoryStorage,
        notifier: RecordingNotifier,
    }

    fn start(stock: Vec<(Product, u32)>, persisted: Option<&str>) -> Harness {
        let (catalog, catalog_client) = CatalogService::seeded(10, stock);
        tokio::spawn(catalog.run());

        let storage = MemoryStorage::new();
        if let Some(raw) = persisted {
            storage.set(KEY, raw).unwrap();
        }
        let notifier = RecordingNotifier::new();
        let (service, client) = CartService::new(
            10,
            KEY,
            Arc::new(catalog_client),
            Arc::new(storage.clone()),
            Arc::new(notifier.clone()),
        );
        tokio::spawn(service.run());
        Harness { client, storage, notifier }
    }

    fn persisted(entries: &[(ProductId, u32)]) -> String {
        Cart::from_items(entries.iter().map(|&(id, amount)| CartItem::new(shoe(id), amount)))
            .to_json()
            .unwrap()
    }

    fn amounts(cart: &Cart) -> Vec<(ProductId, u32)> {
        cart.iter().map(|item| (item.id(), item.amount)).collect()
    }

    #[tokio::test]
    async fn add_to_empty_cart_inserts_and_persists() {
        let h = start(vec![(shoe(1), 3)], None);

        h.client.add_product(1).await;

        let cart = h.client.cart().await.unwrap();
        assert_eq!(amounts(&cart), vec![(1, 1)]);
        assert_eq!(cart.get(1).unwrap().product, shoe(1));
        assert_eq!(h.storage.get(KEY).unwrap(), Some(cart.to_json().unwrap()));
        assert!(h.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn add_at_stock_limit_is_rejected_without_write() {
        let raw = persisted(&[(1, 3)]);
        let h = start(vec![(shoe(1), 3)], Some(&raw));

        h.client.add_product(1).await;

        assert_eq!(amounts(&h.client.cart().await.unwrap()), vec![(1, 3)]);
        assert_eq!(h.storage.get(KEY).unwrap(), Some(raw));
        assert_eq!(h.notifier.messages(), vec!["Requested amount is out of stock"]);
    }

    #[tokio::test]
    async fn add_below_stock_limit_increments_by_one() {
        let h = start(vec![(shoe(1), 3), (shoe(2), 1)], Some(&persisted(&[(1, 1), (2, 1)])));

        h.client.add_product(1).await;

        assert_eq!(amounts(&h.client.cart().await.unwrap()), vec![(1, 2), (2, 1)]);
    }

    #[tokio::test]
    async fn add_unknown_product_notifies_once() {
        let h = start(vec![], None);

        h.client.add_product(99).await;

        assert!(h.client.cart().await.unwrap().is_empty());
        assert_eq!(h.notifier.messages(), vec!["Error adding product"]);
        assert_eq!(h.storage.get(KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn rapid_adds_of_same_product_are_not_lost() {
        let h = start(vec![(shoe(1), 5)], None);

        let first = h.client.clone();
        let second = h.client.clone();
        tokio::join!(first.add_product(1), second.add_product(1));

        assert_eq!(amounts(&h.client.cart().await.unwrap()), vec![(1, 2)]);
    }

    #[tokio::test]
    async fn remove_present_entry_persists() {
        let h = start(vec![], Some(&persisted(&[(1, 2), (2, 1)])));

        h.client.remove_product(1).await;

        let cart = h.client.cart().await.unwrap();
        assert_eq!(amounts(&cart), vec![(2, 1)]);
        assert_eq!(h.storage.get(KEY).unwrap(), Some(cart.to_json().unwrap()));
    }

    #[tokio::test]
    async fn remove_twice_is_safe() {
        let h = start(vec![], Some(&persisted(&[(1, 2)])));

        h.client.remove_product(1).await;
        let after_first = h.storage.snapshot();
        h.client.remove_product(1).await;

        assert!(h.client.cart().await.unwrap().is_empty());
        assert_eq!(h.storage.snapshot(), after_first);
        assert_eq!(h.notifier.messages(), vec!["Error removing product"]);
    }

    #[tokio::test]
    async fn update_with_non_positive_amount_is_silent_noop() {
        let raw = persisted(&[(1, 2)]);
        let h = start(vec![(shoe(1), 3)], Some(&raw));

        for amount in [0, -1, i64::MIN] {
            h.client.update_product_amount(UpdateProductAmount { product_id: 1, amount }).await;
        }

        assert_eq!(amounts(&h.client.cart().await.unwrap()), vec![(1, 2)]);
        assert_eq!(h.storage.get(KEY).unwrap(), Some(raw));
        assert!(h.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn update_above_stock_leaves_entry_unchanged() {
        let raw = persisted(&[(1, 2)]);
        let h = start(vec![(shoe(1), 3)], Some(&raw));

        h.client.update_product_amount(UpdateProductAmount { product_id: 1, amount: 5 }).await;
        h.client.update_product_amount(UpdateProductAmount { product_id: 1, amount: i64::MAX }).await;

        assert_eq!(amounts(&h.client.cart().await.unwrap()), vec![(1, 2)]);
        assert_eq!(h.storage.get(KEY).unwrap(), Some(raw));
        assert_eq!(h.notifier.messages().len(), 2);
    }

    #[tokio::test]
    async fn update_within_stock_sets_amount() {
        let h = start(vec![(shoe(1), 3)], Some(&persisted(&[(1, 2)])));

        h.client.update_product_amount(UpdateProductAmount { product_id: 1, amount: 3 }).await;

        let cart = h.client.cart().await.unwrap();
        assert_eq!(amounts(&cart), vec![(1, 3)]);
        assert_eq!(h.storage.get(KEY).unwrap(), Some(cart.to_json().unwrap()));
    }

    #[tokio::test]
    async fn update_missing_entry_notifies_not_found() {
        let h = start(vec![(shoe(1), 3)], None);

        h.client.update_product_amount(UpdateProductAmount { product_id: 1, amount: 1 }).await;

        assert!(h.client.cart().await.unwrap().is_empty());
        assert_eq!(h.notifier.messages(), vec!["Error changing product amount"]);
    }

    #[tokio::test]
    async fn malformed_persisted_cart_starts_empty() {
        let h = start(vec![(shoe(1), 3)], Some("{not json"));

        assert!(h.client.cart().await.unwrap().is_empty());

        h.client.add_product(1).await;
        assert_eq!(amounts(&h.client.cart().await.unwrap()), vec![(1, 1)]);
    }

    #[tokio::test]
    async fn failed_write_keeps_change_and_notifies() {
        let (catalog, catalog_client) = CatalogService::seeded(10, vec![(shoe(1), 3)]);
        tokio::spawn(catalog.run());
        let notifier = RecordingNotifier::new();
        let (service, client) = CartService::new(
            10,
            KEY,
            Arc::new(catalog_client),
            Arc::new(FailingStorage),
            Arc::new(notifier.clone()),
        );
        tokio::spawn(service.run());

        client.add_product(1).await;

        assert_eq!(amounts(&client.cart().await.unwrap()), vec![(1, 1)]);
        assert_eq!(notifier.messages(), vec!["Could not save cart"]);
    }

    #[tokio::test]
    async fn shutdown_stops_the_actor() {
        let h = start(vec![], None);

        h.client.shutdown().await.unwrap();

        assert!(matches!(h.client.cart().await, Err(CartError::ActorCommunicationError(_))));
        // Mutations against a stopped actor are dropped quietly.
        h.client.add_product(1).await;
    }
}
