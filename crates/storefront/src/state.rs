//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::{Catalog, CatalogClient, CatalogError};
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the catalog and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The catalog starts empty; call [`Catalog::start_loading`] to fill it.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog client cannot be built from the
    /// configured service URL.
    pub fn new(config: StorefrontConfig) -> Result<Self, CatalogError> {
        let client = CatalogClient::new(&config.catalog)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                catalog: Catalog::new(client),
                config,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the in-memory catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the remote product service client.
    #[must_use]
    pub fn client(&self) -> &CatalogClient {
        self.inner.catalog.client()
    }
}
