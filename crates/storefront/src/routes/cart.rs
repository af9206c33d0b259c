//! Cart route handlers.
//!
//! The cart lives in the visitor's session (see [`SessionCart`]). Mutations
//! are plain form posts that redirect back to `/cart`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{FromRequest, State},
    response::{IntoResponse, Redirect, Response},
};
use casualwear_core::{Cart, CartItem, MAX_QUANTITY, ProductId};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::SessionCart;
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: i32,
    pub title: String,
    pub image: String,
    pub rating: String,
    pub quantity: u32,
    /// Quantity posted by the "-" button.
    pub quantity_down: u32,
    /// Quantity posted by the "+" button.
    pub quantity_up: u32,
    pub price: String,
    pub line_price: String,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.as_i32(),
            title: item.title.clone(),
            image: item.image.clone(),
            rating: format!("{}/5", item.rating),
            quantity: item.quantity,
            quantity_down: item.quantity.saturating_sub(1),
            quantity_up: item.quantity.saturating_add(1).min(MAX_QUANTITY),
            price: item.price.to_string(),
            line_price: item.line_total().to_string(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    /// Shipping is always free, so this equals the subtotal.
    pub total: String,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let total = cart.total_price().to_string();
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: total.clone(),
            total,
            item_count: cart.item_count(),
        }
    }
}

/// Form body for the cart mutations; malformed bodies render the 400 page.
#[derive(Debug, FromRequest)]
#[from_request(via(Form), rejection(AppError))]
pub struct CartForm<T>(pub T);

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
}

/// Update cart form data.
///
/// `quantity` is signed: zero or less removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display cart page.
#[instrument(skip(cart))]
pub async fn show(cart: SessionCart) -> CartShowTemplate {
    CartShowTemplate {
        cart: CartView::from(cart.cart()),
    }
}

/// Add a product to the cart.
///
/// The product is fetched from the catalog service so the cart line carries
/// current data. If the fetch fails the cart is left unchanged.
#[instrument(skip(state, cart))]
pub async fn add(
    State(state): State<AppState>,
    mut cart: SessionCart,
    CartForm(form): CartForm<AddToCartForm>,
) -> Result<Response> {
    match state.client().get_product(form.product_id).await {
        Ok(product) => {
            cart.cart_mut().add_to_cart(&product);
            cart.save().await?;
            tracing::info!(
                product_id = %form.product_id,
                item_count = cart.cart().item_count(),
                "Added to cart"
            );
        }
        Err(e) => {
            tracing::error!(product_id = %form.product_id, "Failed to add item to cart: {e}");
        }
    }

    Ok(Redirect::to("/cart").into_response())
}

/// Set a line's quantity.
#[instrument(skip(cart))]
pub async fn update(
    mut cart: SessionCart,
    CartForm(form): CartForm<UpdateCartForm>,
) -> Result<Redirect> {
    cart.cart_mut()
        .update_quantity(form.product_id, form.quantity);
    cart.save().await?;
    Ok(Redirect::to("/cart"))
}

/// Remove a line.
#[instrument(skip(cart))]
pub async fn remove(
    mut cart: SessionCart,
    CartForm(form): CartForm<RemoveFromCartForm>,
) -> Result<Redirect> {
    cart.cart_mut().remove_from_cart(form.product_id);
    cart.save().await?;
    Ok(Redirect::to("/cart"))
}

/// Empty the cart.
#[instrument(skip(cart))]
pub async fn clear(mut cart: SessionCart) -> Result<Redirect> {
    cart.cart_mut().clear_cart();
    cart.save().await?;
    Ok(Redirect::to("/cart"))
}

/// Get cart count badge.
#[instrument(skip(cart))]
pub async fn count(cart: SessionCart) -> CartCountTemplate {
    CartCountTemplate {
        count: cart.cart().item_count(),
    }
}
