//! Catalog products.
//!
//! Products come from the remote catalog service and are read-only on this
//! side. Decoding from the service's loosely typed JSON happens at the client
//! boundary; by the time a [`Product`] exists its fields are validated.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// Highest value on the rating scale.
pub const MAX_RATING: f64 = 5.0;

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique within a single fetch result.
    pub id: ProductId,
    /// Display name.
    pub title: String,
    /// Unit price, never negative.
    pub price: Price,
    /// Image URL.
    pub image: String,
    /// Average rating in `0.0..=5.0`.
    pub rating: f64,
    /// Long description, if the catalog has one.
    pub description: Option<String>,
    /// Category tag. Empty when the catalog has none.
    pub category: String,
    /// Brand tag. Empty when the catalog has none.
    pub brand: String,
    /// Gender tag. Empty when the catalog has none.
    pub gender: String,
    /// Color tags.
    pub colors: BTreeSet<String>,
}

impl Product {
    /// Whether the product carries the given color tag.
    #[must_use]
    pub fn has_color(&self, color: &str) -> bool {
        self.colors.contains(color)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use rust_decimal::Decimal;

    use super::*;

    /// Build a product with the given id, category and whole-dollar price.
    pub fn product(id: i32, category: &str, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Price::usd(Decimal::new(price, 0)),
            image: format!("https://img.example.test/{id}.png"),
            rating: 4.0,
            description: None,
            category: category.to_string(),
            brand: String::new(),
            gender: String::new(),
            colors: BTreeSet::new(),
        }
    }

    /// Same as [`product`] with color tags.
    pub fn colored(id: i32, colors: &[&str]) -> Product {
        Product {
            colors: colors.iter().map(ToString::to_string).collect(),
            ..product(id, "T-shirts", 10)
        }
    }
}
