//! Shopping cart.
//!
//! A [`Cart`] is a plain owned value. Whoever holds it (the storefront keeps
//! one per visitor session) mutates it through the methods below and every
//! later read sees the mutation; there is no shared global cart.

use serde::{Deserialize, Serialize};

use crate::product::Product;
use crate::types::{Price, ProductId};

/// Largest quantity a single cart line can hold.
pub const MAX_QUANTITY: u32 = 999;

/// A cart line: the product fields the cart needs plus a quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub image: String,
    pub rating: f64,
    /// Between 1 and [`MAX_QUANTITY`] while the item is in a cart.
    pub quantity: u32,
}

impl CartItem {
    fn from_product(product: &Product) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            price: product.price,
            image: product.image.clone(),
            rating: product.rating,
            quantity: 1,
        }
    }

    /// Price of this line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Cart line items in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Line items in the order they were first added.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Add one unit of `product`.
    ///
    /// Increments the existing line when the product is already in the cart,
    /// otherwise appends a new line with quantity 1. A line already at
    /// [`MAX_QUANTITY`] stays there.
    pub fn add_to_cart(&mut self, product: &Product) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == product.id) {
            item.quantity = item.quantity.saturating_add(1).min(MAX_QUANTITY);
        } else {
            self.items.push(CartItem::from_product(product));
        }
    }

    /// Remove the line for `id`. Absent ids are ignored.
    pub fn remove_from_cart(&mut self, id: ProductId) {
        self.items.retain(|item| item.id != id);
    }

    /// Set the quantity for `id`.
    ///
    /// A quantity of zero or less removes the line; anything above
    /// [`MAX_QUANTITY`] is clamped to it. Absent ids are ignored.
    pub fn update_quantity(&mut self, id: ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_from_cart(id);
        } else if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.quantity = u32::try_from(quantity).map_or(MAX_QUANTITY, |q| q.min(MAX_QUANTITY));
        }
    }

    /// Sum of `price * quantity` over all lines; zero for an empty cart.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Remove every line.
    pub fn clear_cart(&mut self) {
        self.items.clear();
    }
}
