//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (new arrivals)
//! GET  /category               - Filterable product listing
//! GET  /product/{id}           - Product detail with "You may also like"
//!
//! # Cart
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add a product (redirects to /cart)
//! POST /cart/update            - Set a line's quantity (redirects to /cart)
//! POST /cart/remove            - Remove a line (redirects to /cart)
//! POST /cart/clear             - Empty the cart (redirects to /cart)
//! GET  /cart/count             - Cart count badge (fragment)
//! ```

pub mod cart;
pub mod category;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/category", get(category::index))
        .route("/product/{id}", get(products::show))
        .nest("/cart", cart_routes())
}
