//! Catalog providers
//!
//! A provider turns a group's source identifier into an ordered list of
//! items. The engine only sees the [`CatalogProvider`] trait; failures are
//! reported as [`FetchError`] and always recovered locally.

mod directory;
mod http;

pub use directory::DirectoryCatalog;
pub use http::{leaderboard_query, parse_leaderboard, AssetUrls, HttpCatalog};

use crate::queue::Item;
use crate::{Error, Result};
use async_trait::async_trait;
use kiosk_common::config::{default_catalog_dir, CatalogConfig, CatalogKind};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Catalog unreachable or returned something unusable
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("catalog returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed catalog response: {0}")]
    Parse(String),

    #[error("catalog source not found: {0}")]
    NotFound(String),

    /// The fetch task itself failed (panicked or was cancelled)
    #[error("fetch task failed: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Parse(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::Status {
                status: status.as_u16(),
                body: e.to_string(),
            }
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

/// Source of queue contents for rotation groups
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Fetch the ordered items for `source`
    async fn fetch_queue(&self, source: &str) -> std::result::Result<Vec<Item>, FetchError>;
}

/// Build the provider named by the catalog configuration
pub fn from_config(config: &CatalogConfig) -> Result<Arc<dyn CatalogProvider>> {
    match config.kind {
        CatalogKind::Http => {
            let base_url = config
                .base_url
                .clone()
                .ok_or_else(|| Error::Config("catalog.base_url is required for http".into()))?;
            let assets_url = config.assets_url.clone().unwrap_or_default();
            let catalog = HttpCatalog::new(
                base_url,
                config.api_key.clone(),
                AssetUrls::new(assets_url),
                config.limit,
                std::time::Duration::from_secs(config.request_timeout_secs),
            )?
            .with_songs_resource(config.songs_resource.clone());
            info!("Using HTTP catalog at {}", catalog.base_url());
            Ok(Arc::new(catalog))
        }
        CatalogKind::Directory => {
            let dir = config.directory.clone().unwrap_or_else(default_catalog_dir);
            info!("Using directory catalog at {}", dir.display());
            Ok(Arc::new(DirectoryCatalog::new(dir)))
        }
    }
}
