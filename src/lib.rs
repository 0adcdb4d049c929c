//! # Cart Store
//!
//! Shopping-cart state for a storefront, built as a small actor system.
//!
//! ## Terminology Note
//!
//! - **Service** (e.g. [`CartService`]) = the actor, owning its state and
//!   handling one request at a time
//! - **Client** (e.g. [`CartClient`]) = the cloneable handle used to send it
//!   requests
//!
//! ## Pieces
//!
//! - **Domain types** - [`Cart`], [`CartItem`], [`Product`], [`Stock`]
//! - **Message enums** - [`CartRequest`], [`CatalogRequest`] with oneshot reply channels
//! - **Actors** - [`CartService`] (the single writer of the cart) and
//!   [`CatalogService`] (a local Stock Oracle)
//! - **Collaborators** - [`StockOracle`], [`CartStorage`], [`Notifier`] and
//!   their implementations
//! - **System** - [`CartSystem`] wiring it all together, [`CartConfig`],
//!   [`setup_tracing`]
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cart_store::{CartConfig, CartSystem, TracingNotifier, UpdateProductAmount};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CartConfig::default();
//! let system = CartSystem::with_http(&config, Arc::new(TracingNotifier))?;
//!
//! system.cart_client.add_product(1).await;
//! system.cart_client.update_product_amount(UpdateProductAmount { product_id: 1, amount: 2 }).await;
//! let cart = system.cart_client.cart().await?;
//! println!("{} products, {:.2} total", cart.len(), cart.total());
//!
//! system.shutdown().await?;
//! # Ok(())
//! # }
//! ```
//!
//! Mutations never return an error. Failures are logged and handed to the
//! [`Notifier`]; callers see the outcome by reading the cart again.

pub mod actors;
pub mod adapters;
pub mod app_system;
pub mod clients;
pub mod domain;
pub mod error;
pub mod messages;

#[cfg(test)]
mod mock_framework;

pub use actors::{CartService, CatalogService};
pub use adapters::{
    CartStorage, ChannelNotifier, FileStorage, HttpStockOracle, MemoryStorage, Notification, Notifier, Severity,
    StockOracle, TracingNotifier,
};
pub use app_system::{setup_tracing, CartConfig, CartSystem, DEFAULT_STORAGE_KEY};
pub use clients::{CartClient, CatalogClient};
pub use domain::{Cart, CartItem, Product, ProductId, Stock};
pub use error::{CartError, ConfigError, Operation, StockError, StorageError};
pub use messages::{CartRequest, CatalogRequest, UpdateProductAmount};
