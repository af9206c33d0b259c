//! Integration tests for Casualwear.
//!
//! Each test starts a real storefront on an ephemeral port, backed by a
//! `wiremock` stand-in for the remote product service, and drives it over
//! HTTP with a cookie-keeping `reqwest` client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p casualwear-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use casualwear_storefront::config::{CatalogConfig, StorefrontConfig};
use casualwear_storefront::state::AppState;
use reqwest::Client;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A running storefront plus its mocked product service.
pub struct TestContext {
    /// Cookie-keeping client; one client is one visitor session.
    pub client: Client,
    /// e.g. `http://127.0.0.1:54321`
    pub base_url: String,
    /// The mocked product service.
    pub catalog: MockServer,
    /// Shared state of the running server.
    pub state: AppState,
}

impl TestContext {
    /// Start a storefront whose product service serves `products`.
    ///
    /// The catalog is loaded before this returns.
    pub async fn start(products: Value) -> Self {
        let ctx = Self::start_unloaded(products).await;
        assert!(ctx.state.catalog().reload().await);
        assert!(ctx.state.catalog().is_ready());
        ctx
    }

    /// Start a storefront without loading the catalog.
    pub async fn start_unloaded(products: Value) -> Self {
        let catalog = MockServer::start().await;
        mount_products(&catalog, &products).await;

        let config = StorefrontConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            page_size: 3,
            catalog: CatalogConfig::new(Url::parse(&catalog.uri()).unwrap()),
            sentry_dsn: None,
            sentry_environment: None,
        };
        let state = AppState::new(config).unwrap();

        let listener = tokio::net::TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        let app = casualwear_storefront::app(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            client: new_client(),
            base_url: format!("http://{addr}"),
            catalog,
            state,
        }
    }

    /// Absolute URL for `path` on the storefront.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET `path` and return the status and body.
    pub async fn get(&self, path: &str) -> (reqwest::StatusCode, String) {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        let status = response.status();
        (status, response.text().await.unwrap())
    }

    /// POST a form to `path`, following the redirect, and return the final
    /// status and body.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> (reqwest::StatusCode, String) {
        let response = self
            .client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.text().await.unwrap())
    }
}

/// A fresh visitor: cookie store enabled, redirects followed.
#[must_use]
pub fn new_client() -> Client {
    Client::builder().cookie_store(true).build().unwrap()
}

/// Serve `products` at `/products` and each one at `/products/{id}`.
///
/// Unknown ids fall through to wiremock's default 404.
pub async fn mount_products(server: &MockServer, products: &Value) {
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products))
        .mount(server)
        .await;

    for product in products.as_array().into_iter().flatten() {
        let id = match &product["id"] {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Mock::given(method("GET"))
            .and(path(format!("/products/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(product))
            .mount(server)
            .await;
    }
}

/// A small catalog in the loosely-typed shape the mock service returns.
#[must_use]
pub fn sample_products() -> Value {
    json!([
        {"id": "1", "title": "Classic White Tee", "price": "20", "image": "https://img.test/1.png",
         "rating": 4.5, "category": "T-shirts", "brand": "Acme", "gender": "Men",
         "colors": ["white"], "description": "Soft cotton tee."},
        {"id": "2", "title": "Slim Fit Jeans", "price": "60.50", "image": "https://img.test/2.png",
         "rating": "4.8", "category": "Jeans", "brand": "Denimco", "gender": "Women",
         "colors": ["blue", "black"]},
        {"id": "3", "title": "Graphic Tee", "price": 25, "image": "https://img.test/3.png",
         "rating": 3.9, "category": "T-shirts", "brand": "Acme", "gender": "Women",
         "colors": ["black"]},
        {"id": "4", "title": "Zip Hoodie", "price": 45, "image": "https://img.test/4.png",
         "rating": 4.1, "category": "Hoodies", "brand": "Denimco", "gender": "Men",
         "colors": ["grey"]},
        {"id": "5", "title": "Checkered Shirt", "price": 35, "image": "https://img.test/5.png",
         "rating": 4.0, "category": "Shirts", "brand": "Acme", "gender": "Men",
         "colors": ["red", "black"]}
    ])
}
