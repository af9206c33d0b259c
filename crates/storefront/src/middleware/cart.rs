//! Session-backed cart extractor.
//!
//! Each visitor's [`Cart`] is stored in their session under
//! [`session_keys::CART`]. Handlers take a [`SessionCart`], mutate the cart
//! and call [`SessionCart::save`]; there is no process-wide cart.

use axum::{extract::FromRequestParts, http::request::Parts};
use casualwear_core::Cart;
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::session_keys;

/// The current visitor's cart, loaded from the session.
pub struct SessionCart {
    session: Session,
    cart: Cart,
}

impl SessionCart {
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    /// Write the cart back to the session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the session store rejects the write.
    pub async fn save(&self) -> Result<(), AppError> {
        self.session
            .insert(session_keys::CART, &self.cart)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to save cart to session: {e}")))
    }
}

impl<S> FromRequestParts<S> for SessionCart
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("Session layer is not installed".to_string()))?;

        // An unreadable cart (e.g. from an older format) starts over empty.
        let cart = session
            .get::<Cart>(session_keys::CART)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Discarding unreadable session cart");
                None
            })
            .unwrap_or_default();

        Ok(Self { session, cart })
    }
}
