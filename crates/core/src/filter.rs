//! Product filtering and facet derivation.
//!
//! Criteria combine with AND across dimensions and OR within one dimension's
//! selected values. An empty selection places no constraint on its dimension,
//! so the default [`FilterCriteria`] keeps every product.

use std::collections::BTreeSet;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::product::Product;
use crate::types::Price;

/// Inclusive price bounds. A missing bound is unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl PriceRange {
    /// Build a range from raw form input.
    ///
    /// Empty or non-numeric input leaves that side unconstrained.
    #[must_use]
    pub fn from_inputs(min: Option<&str>, max: Option<&str>) -> Self {
        Self {
            min: min.and_then(Self::parse_bound),
            max: max.and_then(Self::parse_bound),
        }
    }

    /// Parse one bound. Returns `None` for empty or non-numeric input.
    #[must_use]
    pub fn parse_bound(raw: &str) -> Option<Decimal> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Decimal::from_str(raw).ok()
    }

    /// Whether `price` lies within the bounds.
    #[must_use]
    pub fn contains(&self, price: &Price) -> bool {
        if let Some(min) = self.min
            && price.amount < min
        {
            return false;
        }
        if let Some(max) = self.max
            && price.amount > max
        {
            return false;
        }
        true
    }

    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Active constraints narrowing the product list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Case-insensitive title substring. Blank matches everything.
    pub search: String,
    pub price: PriceRange,
    pub categories: BTreeSet<String>,
    pub brands: BTreeSet<String>,
    pub genders: BTreeSet<String>,
    pub colors: BTreeSet<String>,
}

impl FilterCriteria {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    #[must_use]
    pub const fn with_price(mut self, price: PriceRange) -> Self {
        self.price = price;
        self
    }

    #[must_use]
    pub fn with_categories<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = collect_selection(values);
        self
    }

    #[must_use]
    pub fn with_brands<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.brands = collect_selection(values);
        self
    }

    #[must_use]
    pub fn with_genders<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genders = collect_selection(values);
        self
    }

    #[must_use]
    pub fn with_colors<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.colors = collect_selection(values);
        self
    }

    /// True when no dimension constrains anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.price.is_unbounded()
            && self.categories.is_empty()
            && self.brands.is_empty()
            && self.genders.is_empty()
            && self.colors.is_empty()
    }

    /// Whether a single product passes every active dimension.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.matches_search(product)
            && self.price.contains(&product.price)
            && selected(&self.categories, &product.category)
            && selected(&self.brands, &product.brand)
            && selected(&self.genders, &product.gender)
            && (self.colors.is_empty() || product.colors.iter().any(|c| self.colors.contains(c)))
    }

    /// The products that pass, in source order.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }

    fn matches_search(&self, product: &Product) -> bool {
        let term = self.search.trim();
        term.is_empty() || product.title.to_lowercase().contains(&term.to_lowercase())
    }
}

fn collect_selection<I, S>(values: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values
        .into_iter()
        .map(Into::into)
        .filter(|v| !v.trim().is_empty())
        .collect()
}

fn selected(selection: &BTreeSet<String>, value: &str) -> bool {
    selection.is_empty() || selection.contains(value)
}

/// Distinct tag values per filter dimension, sorted lexicographically.
///
/// Derived from the full product list. Rebuild it whenever that list changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facets {
    pub categories: Vec<String>,
    pub brands: Vec<String>,
    pub genders: Vec<String>,
    pub colors: Vec<String>,
}

impl Facets {
    /// Derive facets from `products`. Empty tags are skipped.
    #[must_use]
    pub fn from_products(products: &[Product]) -> Self {
        let mut categories = BTreeSet::new();
        let mut brands = BTreeSet::new();
        let mut genders = BTreeSet::new();
        let mut colors = BTreeSet::new();

        for product in products {
            insert_tag(&mut categories, &product.category);
            insert_tag(&mut brands, &product.brand);
            insert_tag(&mut genders, &product.gender);
            for color in &product.colors {
                insert_tag(&mut colors, color);
            }
        }

        Self {
            categories: categories.into_iter().collect(),
            brands: brands.into_iter().collect(),
            genders: genders.into_iter().collect(),
            colors: colors.into_iter().collect(),
        }
    }
}

fn insert_tag(set: &mut BTreeSet<String>, tag: &str) {
    if !tag.is_empty() && !set.contains(tag) {
        set.insert(tag.to_string());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::product::fixtures::{colored, product};

    fn ids(products: &[&Product]) -> Vec<i32> {
        products.iter().map(|p| p.id.as_i32()).collect()
    }

    #[test]
    fn test_empty_criteria_is_identity() {
        let products = vec![product(1, "A", 10), product(2, "B", 20), colored(3, &["red"])];
        let criteria = FilterCriteria::new();

        assert!(criteria.is_empty());
        let visible = criteria.apply(&products);
        assert_eq!(ids(&visible), vec![1, 2, 3]);
    }

    #[test]
    fn test_category_selection() {
        let products = vec![product(1, "A", 10), product(2, "B", 20)];
        let criteria = FilterCriteria::new().with_categories(["A"]);

        assert_eq!(ids(&criteria.apply(&products)), vec![1]);
    }

    #[test]
    fn test_category_selection_is_or_within_dimension() {
        let products = vec![product(1, "A", 10), product(2, "B", 20), product(3, "C", 30)];
        let criteria = FilterCriteria::new().with_categories(["A", "C"]);

        assert_eq!(ids(&criteria.apply(&products)), vec![1, 3]);
    }

    #[test]
    fn test_min_price() {
        let products = vec![product(1, "A", 10), product(2, "B", 20)];
        let criteria = FilterCriteria::new().with_price(PriceRange::from_inputs(Some("15"), None));

        assert_eq!(ids(&criteria.apply(&products)), vec![2]);
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let products = vec![product(1, "A", 10), product(2, "B", 20), product(3, "C", 30)];
        let criteria =
            FilterCriteria::new().with_price(PriceRange::from_inputs(Some("10"), Some("20")));

        assert_eq!(ids(&criteria.apply(&products)), vec![1, 2]);
    }

    #[test]
    fn test_non_numeric_bounds_impose_no_constraint() {
        let range = PriceRange::from_inputs(Some("abc"), Some("  "));
        assert!(range.is_unbounded());
        assert_eq!(PriceRange::parse_bound("12.50"), Some(Decimal::new(1250, 2)));
        assert_eq!(PriceRange::parse_bound(""), None);
    }

    #[test]
    fn test_color_intersection() {
        let both = colored(1, &["red", "blue"]);
        let blue = colored(2, &["blue"]);
        let criteria = FilterCriteria::new().with_colors(["red"]);

        assert!(criteria.matches(&both));
        assert!(!criteria.matches(&blue));
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let mut shirt = product(1, "A", 10);
        shirt.title = "Gradient Graphic T-shirt".to_string();
        let mut jeans = product(2, "A", 10);
        jeans.title = "Skinny Fit Jeans".to_string();
        let products = vec![shirt, jeans];

        let criteria = FilterCriteria::new().with_search("  GRAPHIC ");
        assert_eq!(ids(&criteria.apply(&products)), vec![1]);
    }

    #[test]
    fn test_dimensions_combine_with_and() {
        let mut p1 = product(1, "Shirts", 40);
        p1.brand = "Acme".to_string();
        let mut p2 = product(2, "Shirts", 40);
        p2.brand = "Other".to_string();
        let mut p3 = product(3, "Jeans", 40);
        p3.brand = "Acme".to_string();
        let products = vec![p1, p2, p3];

        let criteria = FilterCriteria::new()
            .with_categories(["Shirts"])
            .with_brands(["Acme"]);
        assert_eq!(ids(&criteria.apply(&products)), vec![1]);
    }

    #[test]
    fn test_empty_tag_never_matches_selection() {
        let untagged = product(1, "", 10);
        let criteria = FilterCriteria::new().with_genders(["Men"]);
        assert!(!criteria.matches(&untagged));
    }

    #[test]
    fn test_blank_selection_values_are_ignored() {
        let criteria = FilterCriteria::new().with_categories(["", "  "]);
        assert!(criteria.categories.is_empty());
        assert!(criteria.is_empty());
    }

    #[test]
    fn test_facets_are_deduplicated_and_sorted() {
        let products = vec![product(1, "B", 10), product(2, "A", 10), product(3, "B", 10)];
        let facets = Facets::from_products(&products);

        assert_eq!(facets.categories, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_facets_collect_colors_and_skip_empty_tags() {
        let products = vec![colored(1, &["red", "blue"]), colored(2, &["blue", "green"])];
        let facets = Facets::from_products(&products);

        assert_eq!(facets.colors, vec!["blue", "green", "red"]);
        assert!(facets.brands.is_empty());
        assert!(facets.genders.is_empty());
    }

    #[test]
    fn test_facets_follow_source_list() {
        let first = Facets::from_products(&[product(1, "A", 10)]);
        let second = Facets::from_products(&[product(1, "Z", 10)]);
        assert_ne!(first, second);
        assert_eq!(second.categories[0], "Z");
    }
}
