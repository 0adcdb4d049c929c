use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::StockOracle;
use crate::domain::{Product, ProductId, Stock};
use crate::error::StockError;

/// Stock Oracle backed by the storefront REST API.
///
/// Reads `GET {base}/stock/{id}` and `GET {base}/products/{id}`.
#[derive(Debug, Clone)]
pub struct HttpStockOracle {
    http: reqwest::Client,
    base_url: String,
}

impl HttpStockOracle {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, StockError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StockError::Transport(e.to_string()))?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource)
    }

    async fn fetch<T: DeserializeOwned>(&self, resource: String) -> Result<T, StockError> {
        debug!("Sending request");
        let response = self
            .http
            .get(self.url(&resource))
            .send()
            .await
            .map_err(|e| StockError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                warn!(resource = %resource, "Remote resource not found");
                Err(StockError::NotFound(resource))
            }
            status if !status.is_success() => {
                warn!(resource = %resource, status = status.as_u16(), "Unexpected response status");
                Err(StockError::Status { status: status.as_u16(), resource })
            }
            _ => response.json::<T>().await.map_err(|e| StockError::Decode(e.to_string())),
        }
    }
}

#[async_trait]
impl StockOracle for HttpStockOracle {
    #[instrument(skip(self))]
    async fn stock(&self, id: ProductId) -> Result<Stock, StockError> {
        self.fetch(format!("stock/{id}")).await
    }

    #[instrument(skip(self))]
    async fn product(&self, id: ProductId) -> Result<Product, StockError> {
        self.fetch(format!("products/{id}")).await
    }
}
