//! HTTP client for the remote product service.
//!
//! Two read operations: `GET /products` and `GET /products/{id}`. Responses
//! are decoded into [`Product`] at this boundary. There is no retry and no
//! backoff; callers decide what a failure means for their view.

use std::sync::Arc;

use casualwear_core::{Product, ProductId};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use super::CatalogError;
use super::decode::{decode_product, decode_products};
use crate::config::CatalogConfig;

/// Client for the remote product service.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidBaseUrl` if the configured URL cannot
    /// carry path segments, or `CatalogError::Http` if the HTTP client cannot
    /// be built.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        if config.api_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidBaseUrl(config.api_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("casualwear/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url: config.api_url.clone(),
            }),
        })
    }

    /// The configured service base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Fetch the product list, truncated to `limit` when given.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the body is not JSON, or any
    /// record fails to decode.
    #[instrument(skip(self))]
    pub async fn list_products(&self, limit: Option<usize>) -> Result<Vec<Product>, CatalogError> {
        let url = self.endpoint(&["products"])?;
        let body = self.get_json(url).await?.ok_or_else(|| {
            // The collection endpoint itself should never 404.
            CatalogError::NotFound("product list".to_string())
        })?;

        let mut products = decode_products(&body)?;
        if let Some(limit) = limit {
            products.truncate(limit);
        }

        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the service answers 404, or
    /// another error if the request fails or the body does not decode.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let url = self.endpoint(&["products", &id.to_string()])?;
        let body = self
            .get_json(url)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("product {id}")))?;

        Ok(decode_product(&body)?)
    }

    /// Build `base_url/segment/...`, keeping any path already on the base.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::InvalidBaseUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET a JSON document. `Ok(None)` means the service answered 404.
    async fn get_json(&self, url: Url) -> Result<Option<Value>, CatalogError> {
        let response = self
            .inner
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                url = %url,
                body = %body.chars().take(500).collect::<String>(),
                "Catalog service returned non-success status"
            );
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        serde_json::from_str(&body).map(Some).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalog response"
            );
            CatalogError::Parse(e)
        })
    }
}
