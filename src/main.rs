use std::sync::Arc;

use cart_store::{setup_tracing, CartConfig, CartSystem, ChannelNotifier, Product, UpdateProductAmount};
use tracing::{info, warn, Instrument};

fn demo_catalog() -> Vec<(Product, u32)> {
    vec![
        (Product::new(1, "Running shoe", 179.9, "https://cdn.example/running.jpg"), 3),
        (Product::new(2, "Trail shoe", 139.9, "https://cdn.example/trail.jpg"), 5),
        (Product::new(3, "Court shoe", 219.9, "https://cdn.example/court.jpg"), 0),
    ]
}

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => CartConfig::load(&path).map_err(|e| e.to_string())?,
        None => CartConfig::default(),
    };
    info!(storage = %config.storage_path.display(), "Starting cart demo");

    // Notifications would normally feed a toast widget; here they are logged
    let (notifier, mut notifications) = ChannelNotifier::new();
    let toasts = tokio::spawn(async move {
        while let Some(notification) = notifications.recv().await {
            warn!(message = %notification.message, "Toast");
        }
    });

    let system = CartSystem::with_catalog(&config, demo_catalog(), Arc::new(notifier));
    let cart = &system.cart_client;

    let span = tracing::info_span!("shopping");
    async {
        cart.add_product(1).await;
        cart.add_product(1).await;
        cart.add_product(2).await;
        // Out of stock: raises a notification, cart unchanged
        cart.add_product(3).await;
        // Above stock: rejected
        cart.update_product_amount(UpdateProductAmount { product_id: 1, amount: 10 }).await;
        cart.update_product_amount(UpdateProductAmount { product_id: 2, amount: 4 }).await;
        // Not in cart
        cart.remove_product(3).await;
    }
    .instrument(span)
    .await;

    let snapshot = cart.cart().await.map_err(|e| e.to_string())?;
    for item in &snapshot {
        info!(
            product_id = item.id(),
            title = %item.product.title,
            amount = item.amount,
            subtotal = %format!("{:.2}", item.subtotal()),
            "Cart entry"
        );
    }
    info!(products = snapshot.len(), units = snapshot.total_units(), total = %format!("{:.2}", snapshot.total()), "Cart total");

    system.shutdown().await?;
    // Every notifier clone is gone once the actors stop, which ends the toast task
    let _ = toasts.await;

    info!("Cart demo completed");
    Ok(())
}
