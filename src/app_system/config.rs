use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Storage key the storefront has always used for the cart.
pub const DEFAULT_STORAGE_KEY: &str = "@RocketShoes:cart";

/// Runtime settings for a [`CartSystem`](super::CartSystem).
///
/// Every field has a default, so a config file only needs the values it
/// changes:
///
/// ```toml
/// api_base_url = "http://localhost:3333"
/// storage_path = "/var/lib/storefront/cart.json"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CartConfig {
    /// Capacity of each actor's request channel.
    pub buffer_size: usize,
    pub storage_key: String,
    pub storage_path: PathBuf,
    pub api_base_url: String,
    pub request_timeout_ms: u64,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            buffer_size: 32,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            storage_path: PathBuf::from("cart-storage.json"),
            api_base_url: "http://localhost:3333".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

impl CartConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(CartConfig::from_toml_str("").unwrap(), CartConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let config = CartConfig::from_toml_str(
            r#"
            api_base_url = "https://shop.example/api"
            request_timeout_ms = 2500
            "#,
        )
        .unwrap();
        assert_eq!(config.api_base_url, "https://shop.example/api");
        assert_eq!(config.request_timeout(), Duration::from_millis(2500));
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(CartConfig::from_toml_str("bufer_size = 3"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CartConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
