use std::sync::Arc;

use tracing::{error, info, instrument};

use super::CartConfig;
use crate::actors::{CartService, CatalogService};
use crate::adapters::{CartStorage, FileStorage, HttpStockOracle, Notifier, StockOracle};
use crate::clients::{CartClient, CatalogClient};
use crate::domain::Product;
use crate::error::StockError;

/// Owns the running actors and the handles callers use to reach them.
///
/// Exactly one cart actor exists per system; hand out clones of
/// `cart_client` rather than starting a second system over the same storage.
pub struct CartSystem {
    pub cart_client: CartClient,
    /// Present when the system runs against the in-process catalog.
    pub catalog_client: Option<CatalogClient>,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl CartSystem {
    /// Starts the cart against any Stock Oracle and persistence adapter.
    #[instrument(name = "cart_system", skip_all)]
    pub fn start(
        config: &CartConfig,
        oracle: Arc<dyn StockOracle>,
        storage: Arc<dyn CartStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        info!("Starting cart system");
        let (cart_service, cart_client) =
            CartService::new(config.buffer_size, config.storage_key.clone(), oracle, storage, notifier);
        let handle = tokio::spawn(cart_service.run());
        info!("Cart system started");

        Self {
            cart_client,
            catalog_client: None,
            handles: vec![handle],
        }
    }

    /// Starts the catalog actor first, then the cart wired to it, with the
    /// cart persisted to `config.storage_path`.
    #[instrument(name = "cart_system", skip_all)]
    pub fn with_catalog(
        config: &CartConfig,
        catalog: impl IntoIterator<Item = (Product, u32)>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (catalog_service, catalog_client) = CatalogService::seeded(config.buffer_size, catalog);
        let catalog_handle = tokio::spawn(catalog_service.run());

        let storage = Arc::new(FileStorage::new(&config.storage_path));
        let mut system = Self::start(config, Arc::new(catalog_client.clone()), storage, notifier);
        system.catalog_client = Some(catalog_client);
        system.handles.push(catalog_handle);
        system
    }

    /// Starts the cart against the storefront REST API.
    pub fn with_http(config: &CartConfig, notifier: Arc<dyn Notifier>) -> Result<Self, StockError> {
        let oracle = HttpStockOracle::new(config.api_base_url.clone(), config.request_timeout())?;
        let storage = Arc::new(FileStorage::new(&config.storage_path));
        Ok(Self::start(config, Arc::new(oracle), storage, notifier))
    }

    /// Stops the cart first (it depends on the catalog), then the catalog,
    /// and waits for every task to finish.
    #[instrument(skip(self))]
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down cart system");

        let _ = self.cart_client.shutdown().await;
        if let Some(catalog_client) = &self.catalog_client {
            let _ = catalog_client.shutdown().await;
        }

        let mut failed = false;
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Service shutdown error");
                failed = true;
            }
        }
        if failed {
            return Err("One or more services failed during shutdown".to_string());
        }

        info!("Cart system shutdown complete");
        Ok(())
    }
}
