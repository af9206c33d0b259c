//! Remote product catalog.
//!
//! [`CatalogClient`] talks to the remote product service. [`Catalog`] keeps
//! the full product list in memory for the listing pages: the app starts
//! serving immediately, a background task loads the list and swaps it in when
//! ready, and an optional interval reloads it.

mod client;
mod decode;
mod load;

use std::sync::Arc;
use std::time::Duration;

use casualwear_core::{Facets, Product};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

pub use client::CatalogClient;
pub use decode::{DecodeError, decode_product, decode_products};
pub use load::{LoadSlot, LoadState, LoadTicket};

/// Errors from the remote product service.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog service returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid JSON from catalog service: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid catalog data: {0}")]
    Decode(#[from] DecodeError),

    #[error("invalid catalog base URL: {0}")]
    InvalidBaseUrl(String),
}

/// A successfully loaded product list and the facets derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSnapshot {
    pub products: Arc<Vec<Product>>,
    pub facets: Arc<Facets>,
}

impl CatalogSnapshot {
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        let facets = Facets::from_products(&products);
        Self {
            products: Arc::new(products),
            facets: Arc::new(facets),
        }
    }
}

/// In-memory copy of the remote product list.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    client: CatalogClient,
    slot: LoadSlot<CatalogSnapshot>,
    shutdown: CancellationToken,
}

impl Catalog {
    /// Create an empty catalog. Nothing is fetched until [`reload`](Self::reload)
    /// or [`start_loading`](Self::start_loading).
    #[must_use]
    pub fn new(client: CatalogClient) -> Self {
        Self {
            inner: Arc::new(CatalogInner {
                client,
                slot: LoadSlot::new(),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// The underlying service client.
    #[must_use]
    pub fn client(&self) -> &CatalogClient {
        &self.inner.client
    }

    /// Fetch the full product list and swap it in.
    ///
    /// Returns `true` if this load's outcome was recorded. On failure the
    /// previous list stays visible.
    #[instrument(skip(self))]
    pub async fn reload(&self) -> bool {
        let client = &self.inner.client;
        self.inner
            .slot
            .run(async {
                client
                    .list_products(None)
                    .await
                    .map(CatalogSnapshot::new)
            })
            .await
    }

    /// Spawn the background load task.
    ///
    /// Loads once, then every `refresh` if given, until [`shutdown`](Self::shutdown).
    pub fn start_loading(&self, refresh: Option<Duration>) -> JoinHandle<()> {
        let catalog = self.clone();
        info!(?refresh, "Spawning background catalog load task");

        tokio::spawn(async move {
            let shutdown = catalog.inner.shutdown.clone();
            loop {
                tokio::select! {
                    () = shutdown.cancelled() => break,
                    _ = catalog.reload() => {}
                }

                if let Some(snapshot) = catalog.snapshot() {
                    info!(
                        products = snapshot.products.len(),
                        categories = snapshot.facets.categories.len(),
                        "Catalog is ready"
                    );
                }

                let Some(period) = refresh else { break };
                tokio::select! {
                    () = shutdown.cancelled() => break,
                    () = tokio::time::sleep(period) => {}
                }
            }
            info!("Catalog load task stopped");
        })
    }

    /// Current load state.
    #[must_use]
    pub fn state(&self) -> LoadState<CatalogSnapshot> {
        self.inner.slot.state()
    }

    /// The loaded catalog, if any load has succeeded.
    #[must_use]
    pub fn snapshot(&self) -> Option<CatalogSnapshot> {
        self.inner.slot.value()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state().is_loaded()
    }

    /// Error from the most recent failed load.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.inner.slot.last_error()
    }

    /// Stop the background task and cancel any load in flight.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
        self.inner.slot.cancel();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use url::Url;

    use super::*;
    use crate::config::CatalogConfig;

    fn sample() -> Vec<Product> {
        decode_products(&json!([
            {"id": 1, "title": "Tee", "price": 10, "image": "a.png", "rating": 4,
             "category": "Shirts", "brand": "Acme", "gender": "Men", "colors": ["red"]},
            {"id": 2, "title": "Jeans", "price": 40, "image": "b.png", "rating": 3,
             "category": "Pants", "brand": "Acme", "gender": "Women", "colors": ["blue"]}
        ]))
        .unwrap()
    }

    #[test]
    fn test_snapshot_derives_facets() {
        let snapshot = CatalogSnapshot::new(sample());
        assert_eq!(snapshot.products.len(), 2);
        assert_eq!(snapshot.facets.categories, vec!["Pants", "Shirts"]);
        assert_eq!(snapshot.facets.brands, vec!["Acme"]);
        assert_eq!(snapshot.facets.colors, vec!["blue", "red"]);
    }

    #[tokio::test]
    async fn test_catalog_starts_idle_and_shutdown_is_idempotent() {
        let config = CatalogConfig::new(Url::parse("http://127.0.0.1:9").unwrap());
        let catalog = Catalog::new(CatalogClient::new(&config).unwrap());

        assert_eq!(catalog.state(), LoadState::Idle);
        assert!(catalog.snapshot().is_none());

        catalog.shutdown();
        catalog.shutdown();
        assert!(!catalog.is_ready());
    }

    #[test]
    fn test_status_error_message() {
        let err = CatalogError::Status {
            status: 503,
            url: "http://svc/products".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "catalog service returned 503 for http://svc/products"
        );
    }
}
