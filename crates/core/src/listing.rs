//! Ordering and pagination of a filtered product list.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::product::Product;

/// Sort order for product listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Catalog order.
    #[default]
    Featured,
    PriceAsc,
    PriceDesc,
    RatingDesc,
    Title,
}

impl SortOrder {
    pub const ALL: [Self; 5] = [
        Self::Featured,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::RatingDesc,
        Self::Title,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::RatingDesc => "rating_desc",
            Self::Title => "title",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Featured => "Most Popular",
            Self::PriceAsc => "Price: Low to High",
            Self::PriceDesc => "Price: High to Low",
            Self::RatingDesc => "Top Rated",
            Self::Title => "Name",
        }
    }

    /// Parse a query-string value. Unknown values fall back to `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|order| order.as_str() == s)
    }

    /// Sort `products` in place. The sort is stable, so ties keep catalog order.
    pub fn sort(self, products: &mut [&Product]) {
        match self {
            Self::Featured => {}
            Self::PriceAsc => products.sort_by(|a, b| a.price.amount.cmp(&b.price.amount)),
            Self::PriceDesc => products.sort_by(|a, b| b.price.amount.cmp(&a.price.amount)),
            Self::RatingDesc => products.sort_by(|a, b| {
                b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal)
            }),
            Self::Title => products.sort_by_key(|p| p.title.to_lowercase()),
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number, clamped to `1..=total_pages`.
    pub number: usize,
    /// At least 1, even for an empty listing.
    pub total_pages: usize,
    /// Number of items across all pages.
    pub total_items: usize,
}

impl<T> Page<T> {
    /// Cut page `number` (1-based) of `size` items out of `items`.
    ///
    /// Out-of-range page numbers are clamped; a `size` of zero is treated as 1.
    #[must_use]
    pub fn paginate(items: Vec<T>, number: usize, size: usize) -> Self {
        let size = size.max(1);
        let total_items = items.len();
        let total_pages = total_items.div_ceil(size).max(1);
        let number = number.clamp(1, total_pages);

        let items = items
            .into_iter()
            .skip((number - 1) * size)
            .take(size)
            .collect();

        Self {
            items,
            number,
            total_pages,
            total_items,
        }
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::fixtures::product;

    #[test]
    fn test_sort_order_round_trips_query_values() {
        for order in SortOrder::ALL {
            assert_eq!(SortOrder::parse(order.as_str()), Some(order));
        }
        assert_eq!(SortOrder::parse("cheapest"), None);
    }

    #[test]
    fn test_sort_by_price() {
        let products = [product(1, "A", 30), product(2, "A", 10), product(3, "A", 20)];
        let mut refs: Vec<&Product> = products.iter().collect();

        SortOrder::PriceAsc.sort(&mut refs);
        let ids: Vec<i32> = refs.iter().map(|p| p.id.as_i32()).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        SortOrder::PriceDesc.sort(&mut refs);
        let ids: Vec<i32> = refs.iter().map(|p| p.id.as_i32()).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn test_featured_keeps_catalog_order() {
        let products = [product(2, "A", 30), product(1, "A", 10)];
        let mut refs: Vec<&Product> = products.iter().collect();

        SortOrder::Featured.sort(&mut refs);
        let ids: Vec<i32> = refs.iter().map(|p| p.id.as_i32()).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_paginate_middle_page() {
        let page = Page::paginate((1..=20).collect::<Vec<_>>(), 2, 9);
        assert_eq!(page.items, (10..=18).collect::<Vec<_>>());
        assert_eq!(page.total_pages, 3);
        assert!(page.has_previous());
        assert!(page.has_next());
    }

    #[test]
    fn test_paginate_clamps_page_number() {
        let page = Page::paginate((1..=5).collect::<Vec<_>>(), 10, 2);
        assert_eq!(page.number, 3);
        assert_eq!(page.items, vec![5]);

        let page = Page::paginate((1..=5).collect::<Vec<_>>(), 0, 2);
        assert_eq!(page.number, 1);
    }

    #[test]
    fn test_paginate_empty_listing_has_one_page() {
        let page: Page<i32> = Page::paginate(Vec::new(), 1, 9);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next());
    }
}
